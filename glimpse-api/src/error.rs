//! Error Types for Glimpse API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as `{success: false, code, error, details}`
//! with the HTTP status code of their `ErrorCode`.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use glimpse_core::{AnalysisError, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::processor::ProcessError;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400, 413, 422)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Upload does not declare an image media type
    InvalidMediaType,

    /// Upload carries no bytes
    EmptyPayload,

    /// Multipart body could not be parsed
    InvalidMultipart,

    /// Invalid input data (configuration, query parameters)
    InvalidInput,

    /// Upload exceeds the configured size limit
    PayloadTooLarge,

    /// Required field is missing from request
    MissingField,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// Analysis engine has not finished warming up
    ServiceNotReady,

    /// Analysis of a valid upload failed
    ProcessingFailed,

    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidMediaType
            | ErrorCode::EmptyPayload
            | ErrorCode::InvalidMultipart
            | ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,

            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            ErrorCode::MissingField => StatusCode::UNPROCESSABLE_ENTITY,

            ErrorCode::ServiceNotReady => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::ProcessingFailed | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidMediaType => "File must be an image",
            ErrorCode::EmptyPayload => "File is empty",
            ErrorCode::InvalidMultipart => "Invalid multipart body",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::PayloadTooLarge => "File is too large",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::ServiceNotReady => {
                "Service not ready. Please wait for the warmup to complete."
            }
            ErrorCode::ProcessingFailed => "Processing failed",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Always `false`
    #[serde(default)]
    pub success: bool,

    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    #[serde(rename = "error")]
    pub message: String,

    /// Optional additional context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// Create a ValidationFailed error.
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
        .with_details(serde_json::json!({ "field": field }))
    }

    /// Create an InvalidMultipart error.
    pub fn invalid_multipart(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidMultipart, message)
    }

    /// Create a PayloadTooLarge error.
    pub fn payload_too_large(limit: usize) -> Self {
        Self::new(
            ErrorCode::PayloadTooLarge,
            format!("File exceeds the {} byte upload limit", limit),
        )
        .with_details(serde_json::json!({ "limit_bytes": limit }))
    }

    /// Create a ServiceNotReady error.
    pub fn service_not_ready() -> Self {
        Self::from_code(ErrorCode::ServiceNotReady)
    }

    /// Create a ProcessingFailed error.
    pub fn processing_failed(reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ProcessingFailed,
            format!("Processing failed: {}", reason),
        )
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match &err {
            ValidationError::NotAnImage { media_type } => {
                Self::new(ErrorCode::InvalidMediaType, err.to_string())
                    .with_details(serde_json::json!({ "content_type": media_type }))
            }
            ValidationError::EmptyPayload => Self::new(ErrorCode::EmptyPayload, err.to_string()),
            ValidationError::TooLarge { limit } => Self::payload_too_large(*limit),
        }
    }
}

/// Map request pipeline failures onto caller-facing errors.
///
/// Storage failures never reach this point: the processor absorbs them.
impl From<ProcessError> for ApiError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Validation(e) => e.into(),
            ProcessError::NotReady => Self::service_not_ready(),
            ProcessError::Analysis(e) => {
                tracing::error!(error = %e, "Image analysis failed");
                let (kind, reason) = match &e {
                    AnalysisError::UnsupportedImage(_) => {
                        ("unsupported_image", "image could not be decoded")
                    }
                    AnalysisError::Timeout { .. } => ("timeout", "analysis timed out"),
                    _ => ("analysis_failed", "analysis failed"),
                };
                Self::processing_failed(reason).with_details(serde_json::json!({ "kind": kind }))
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::new(ErrorCode::PayloadTooLarge, err.body_text())
        } else {
            Self::invalid_multipart(err.body_text())
        }
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
