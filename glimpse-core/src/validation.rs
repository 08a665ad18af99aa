//! Boundary checks applied to an upload before it is fingerprinted.

use crate::error::ValidationError;

/// Media type prefix every accepted upload must declare.
pub const IMAGE_MEDIA_PREFIX: &str = "image/";

/// Reject uploads that do not declare an image media type or carry no bytes.
///
/// The media type is checked first, so an empty non-image upload reports
/// `NotAnImage`.
pub fn validate_upload(media_type: Option<&str>, data: &[u8]) -> Result<(), ValidationError> {
    let is_image = media_type
        .map(|mt| mt.trim().to_ascii_lowercase().starts_with(IMAGE_MEDIA_PREFIX))
        .unwrap_or(false);
    if !is_image {
        return Err(ValidationError::NotAnImage {
            media_type: media_type.map(str::to_string),
        });
    }
    if data.is_empty() {
        return Err(ValidationError::EmptyPayload);
    }
    Ok(())
}
