//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;

/// Response body for reading an entry (GET /caches/:name/entries/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: String,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for storing an entry (PUT /caches/:name/entries/:key)
#[derive(Debug, Clone, Serialize)]
pub struct PutResponse {
    pub message: String,
    pub key: String,
    /// False when `if_absent` was requested and the key was taken
    pub stored: bool,
}

impl PutResponse {
    pub fn new(key: impl Into<String>, stored: bool) -> Self {
        let key = key.into();
        let message = if stored {
            format!("Key '{}' set successfully", key)
        } else {
            format!("Key '{}' already present", key)
        };
        Self {
            message,
            key,
            stored,
        }
    }
}

/// Response body for deleting an entry (DELETE /caches/:name/entries/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for replacing an entry
#[derive(Debug, Clone, Serialize)]
pub struct ReplaceResponse {
    pub key: String,
    pub replaced: bool,
}

impl ReplaceResponse {
    pub fn new(key: impl Into<String>, replaced: bool) -> Self {
        Self {
            key: key.into(),
            replaced,
        }
    }
}

/// Response body for a bulk lookup; missing keys are omitted
#[derive(Debug, Clone, Serialize)]
pub struct GetAllResponse {
    pub entries: BTreeMap<String, String>,
}

impl GetAllResponse {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }
}

/// Response body for cache lifecycle calls
#[derive(Debug, Clone, Serialize)]
pub struct CacheResponse {
    pub message: String,
    pub name: String,
}

impl CacheResponse {
    pub fn created(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            message: format!("Cache '{}' created", name),
            name,
        }
    }

    pub fn destroyed(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            message: format!("Cache '{}' destroyed", name),
            name,
        }
    }

    pub fn cleared(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            message: format!("Cache '{}' cleared", name),
            name,
        }
    }
}

/// Response body for listing caches (GET /caches)
#[derive(Debug, Clone, Serialize)]
pub struct CacheListResponse {
    pub caches: Vec<String>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
