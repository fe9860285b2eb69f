//! Error types for media-dl
//!
//! This module provides error handling for the library, including:
//! - The crate-wide [`Error`] enum and [`Result`] alias
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes
//!
//! Failures on the request path (bad URL, failed info extraction, missing file)
//! are returned to the caller. Failures of a background download never travel
//! through this type to a client; the job runner records them in the job's
//! status instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for media-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Empty or malformed request input (e.g. missing URL)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The extraction engine could not resolve information for a URL
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// The extraction engine failed while downloading
    #[error("{0}")]
    Download(String),

    /// Requested file does not exist in the downloads directory
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download_dir")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// External tool execution failed (yt-dlp missing, crashed, etc.)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Operation not supported (missing binary, not implemented, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "invalid_request",
///     "message": "invalid request: a valid URL is required"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "invalid_request")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - bad input or unresolvable URL
            Error::InvalidRequest(_) => 400,
            Error::Extraction(_) => 400,
            Error::Config { .. } => 400,

            // 404 Not Found
            Error::FileNotFound(_) => 404,

            // 500 Internal Server Error
            Error::Download(_) => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,

            // 503 Service Unavailable - engine binary unusable
            Error::ExternalTool(_) => 503,

            // 501 Not Implemented
            Error::NotSupported(_) => 501,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::InvalidRequest(_) => "invalid_request",
            Error::Extraction(_) => "extraction_failed",
            Error::Download(_) => "download_failed",
            Error::FileNotFound(_) => "file_not_found",
            Error::Config { .. } => "config_error",
            Error::Io(_) => "io_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::NotSupported(_) => "not_supported",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::FileNotFound(name) => Some(serde_json::json!({
                "filename": name,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
