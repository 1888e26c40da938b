//! Error types for the cache library and server
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
/// Unified error type for caches, the cache manager and the HTTP layer.
///
/// A missing key is never an error inside a cache (lookups return `None`);
/// `NotFound` is only raised at the HTTP boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key or cache not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A cache with the same name is already registered
    #[error("A cache named {0} already exists")]
    AlreadyExists(String),

    /// Operation attempted on a closed cache or manager
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Typed lookup disagrees with the declared key/value types
    #[error("Incompatible cache {kind} types specified, expected {expected} but {requested} was specified")]
    TypeMismatch {
        /// Either "key" or "value"
        kind: &'static str,
        expected: &'static str,
        requested: &'static str,
    },

    /// Invalid argument (empty cache name, malformed request data)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Shorthand for the error returned by operations on a closed cache.
    pub(crate) fn cache_closed(name: &str) -> Self {
        CacheError::IllegalState(format!("cache '{}' is closed", name))
    }

    /// Shorthand for the error returned by operations on a closed manager.
    pub(crate) fn manager_closed() -> Self {
        CacheError::IllegalState("cache manager is closed".to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::AlreadyExists(_) => StatusCode::CONFLICT,
            CacheError::IllegalState(_) => StatusCode::GONE,
            CacheError::TypeMismatch { .. } => StatusCode::CONFLICT,
            CacheError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
