//! Error types for the object cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the object cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key absent, or present but older than the caller's reference time
    #[error("Key not found in cache: {0}")]
    NotFound(String),

    /// Committed payload exceeds the per-entry cap
    #[error("Not enough space in cache for '{key}': {size} bytes exceeds entry limit of {limit}")]
    CacheFull { key: String, size: u64, limit: u64 },

    /// Rejected cache configuration
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),

    /// A streaming write would grow the sink past the per-entry cap
    #[error("Attempted excess write on cache for '{key}': limit is {limit} bytes")]
    ExcessWrite { key: String, limit: u64 },

    /// Background work requested without a tokio runtime
    #[error("Runtime unavailable: {0}")]
    Runtime(String),
}

impl CacheError {
    /// Returns true for the not-found variant.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound(_))
    }
}

impl From<CacheError> for std::io::Error {
    fn from(err: CacheError) -> Self {
        let kind = match err {
            CacheError::NotFound(_) => std::io::ErrorKind::NotFound,
            CacheError::CacheFull { .. } | CacheError::ExcessWrite { .. } => {
                std::io::ErrorKind::InvalidInput
            }
            CacheError::InvalidConfig(_) | CacheError::Runtime(_) => std::io::ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::CacheFull { .. } | CacheError::ExcessWrite { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            CacheError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            CacheError::Runtime(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the object cache.
pub type Result<T> = std::result::Result<T, CacheError>;
