//! Content fingerprints.
//!
//! A fingerprint is the lowercase hex SHA-256 digest of the raw upload bytes.
//! It is the primary key of the result store, so two uploads share a cached
//! result exactly when their bytes are identical.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::FingerprintError;

/// Number of hex characters in a SHA-256 fingerprint.
pub const FINGERPRINT_LEN: usize = 64;

/// Hex-encoded SHA-256 digest of an upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema), schema(value_type = String))]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Borrow the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key bytes used by persistent stores.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Short prefix for log lines.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

/// Compute the fingerprint of `content`.
///
/// Total over all inputs: the empty slice hashes to the SHA-256 of the empty
/// sequence.
pub fn fingerprint(content: &[u8]) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(content);
    Fingerprint(hex::encode(hasher.finalize()))
}

impl FromStr for Fingerprint {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != FINGERPRINT_LEN {
            return Err(FingerprintError::InvalidLength { actual: s.len() });
        }
        if let Some(c) = s.chars().find(|c| !matches!(c, '0'..='9' | 'a'..='f')) {
            return Err(FingerprintError::InvalidCharacter(c));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = FingerprintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Fingerprint> for String {
    fn from(value: Fingerprint) -> Self {
        value.0
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
