//! Image processing endpoint.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};

use crate::constants::UPLOAD_FIELD;
use crate::error::{ApiError, ApiResult};
use crate::processor::{ImageProcessor, Upload};
use crate::types::ProcessImageResponse;

/// POST /process-image - Analyze an uploaded image, reusing stored results
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/process-image",
    tag = "Images",
    request_body(
        content_type = "multipart/form-data",
        description = "Multipart form with a `file` field"
    ),
    responses(
        (status = 200, description = "Image processed", body = ProcessImageResponse),
        (status = 400, description = "Upload is not an image or is empty", body = ApiError),
        (status = 413, description = "Upload exceeds the size limit", body = ApiError),
        (status = 422, description = "No `file` field in the request", body = ApiError),
        (status = 500, description = "Analysis failed", body = ApiError),
        (status = 503, description = "Analysis engine still warming up", body = ApiError),
    ),
))]
pub async fn process_image(
    State(processor): State<Arc<ImageProcessor>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ProcessImageResponse>> {
    let mut multipart = multipart.map_err(|rejection| {
        ApiError::missing_field(UPLOAD_FIELD).with_details(serde_json::json!({
            "field": UPLOAD_FIELD,
            "reason": rejection.body_text(),
        }))
    })?;

    let upload = read_upload(&mut multipart).await?;
    let processed = processor.process(upload).await?;
    Ok(Json(processed.into()))
}

/// Take the first `file` field, ignoring any others.
async fn read_upload(multipart: &mut Multipart) -> ApiResult<Upload> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let media_type = field.content_type().map(str::to_string);
        let filename = field.file_name().map(str::to_string);
        let data = field.bytes().await?;
        return Ok(Upload {
            data,
            media_type,
            filename,
        });
    }
    Err(ApiError::missing_field(UPLOAD_FIELD))
}
