//! Analysis engine capability.
//!
//! The engine is an opaque, slow function over image bytes with a one-time
//! warmup. Implementations live outside this crate; the request path only
//! sees this trait.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::error::AnalysisError;

/// Image analysis backend.
#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    /// Short identifier used in logs and status output.
    fn name(&self) -> &str;

    /// One-time initialization. Called before the first `analyze`.
    async fn warmup(&self) -> Result<(), AnalysisError>;

    /// Analyze raw image bytes, returning an opaque JSON payload.
    async fn analyze(&self, data: Bytes) -> Result<Value, AnalysisError>;
}
