//! Error types for the document pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Document pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unsupported MIME type at ingestion
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    /// Extraction produced no usable text (scanned-image or corrupt document)
    #[error("No text content could be extracted from the document")]
    EmptyExtraction,

    /// Underlying document parser failure
    #[error("Failed to extract text: {message}")]
    Extraction { message: String },

    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Document already analyzed and force was not set
    #[error("Document {0} is already analyzed; pass force=true to re-analyze")]
    AlreadyAnalyzed(String),

    /// Analysis attempt failed (terminal for the current job)
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Blob store error
    #[error("Blob store error: {0}")]
    BlobStore(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Malformed client request
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an extraction error
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction {
            message: message.into(),
        }
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create a blob store error
    pub fn blob_store(message: impl Into<String>) -> Self {
        Self::BlobStore(message.into())
    }

    /// Create a database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Config(msg) => (StatusCode::BAD_REQUEST, "config_error", msg.clone()),
            Error::UnsupportedType(mime) => (
                StatusCode::BAD_REQUEST,
                "unsupported_type",
                format!("Unsupported file type: {}", mime),
            ),
            Error::EmptyExtraction => (
                StatusCode::BAD_REQUEST,
                "empty_extraction",
                self.to_string(),
            ),
            Error::Extraction { .. } => {
                (StatusCode::BAD_REQUEST, "extraction_error", self.to_string())
            }
            Error::DocumentNotFound(id) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Document not found: {}", id),
            ),
            Error::AlreadyAnalyzed(_) => {
                (StatusCode::CONFLICT, "already_analyzed", self.to_string())
            }
            Error::AnalysisFailed(msg) => {
                (StatusCode::BAD_GATEWAY, "analysis_failed", msg.clone())
            }
            Error::Llm(msg) => (StatusCode::SERVICE_UNAVAILABLE, "llm_error", msg.clone()),
            Error::BlobStore(msg) => (StatusCode::BAD_GATEWAY, "blob_store_error", msg.clone()),
            Error::Database(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", msg.clone())
            }
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Http(err) => (StatusCode::BAD_GATEWAY, "http_error", err.to_string()),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
