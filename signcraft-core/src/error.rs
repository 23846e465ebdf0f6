//! Error types for signcraft-core.

use thiserror::Error;

/// Result type alias using SignError.
pub type SignResult<T> = Result<T, SignError>;

/// Errors that can occur while loading configuration or design documents.
#[derive(Debug, Error)]
pub enum SignError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to decode a JSON payload.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read a local file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A design document referenced a selection that cannot be resolved.
    #[error("Invalid design document: {0}")]
    InvalidDocument(String),
}
