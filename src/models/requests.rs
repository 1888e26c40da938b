//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::cache::ExpiryPolicyKind;

// == Limits ==
/// Maximum allowed cache name or key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

/// Request body for creating a cache (PUT /caches/:name)
///
/// # Fields
/// - `expiry`: Optional expiry policy (server default if not specified)
/// - `store_by_value`: Declared storage semantics (default: true)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCacheRequest {
    #[serde(default)]
    pub expiry: Option<ExpiryPolicyKind>,
    #[serde(default)]
    pub store_by_value: Option<bool>,
}

/// Request body for storing a value (PUT /caches/:name/entries/:key)
#[derive(Debug, Clone, Deserialize)]
pub struct PutEntryRequest {
    /// The value to store
    pub value: String,
    /// Only store if the key has no live entry
    #[serde(default)]
    pub if_absent: bool,
}

/// Request body for replacing a value (POST /caches/:name/entries/:key/replace)
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceRequest {
    /// The new value
    pub value: String,
    /// Replace only if the current value equals this
    #[serde(default)]
    pub expected: Option<String>,
}

/// Request body for a bulk lookup (POST /caches/:name/get-all)
#[derive(Debug, Clone, Deserialize)]
pub struct GetAllRequest {
    pub keys: Vec<String>,
}

/// Validates a cache name or key.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(kind: &str, key: &str) -> Option<String> {
    if key.is_empty() {
        return Some(format!("{} cannot be empty", kind));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "{} exceeds maximum length of {} bytes",
            kind, MAX_KEY_LENGTH
        ));
    }
    None
}

/// Validates a value to be stored.
pub fn validate_value(value: &str) -> Option<String> {
    if value.len() > MAX_VALUE_SIZE {
        return Some(format!(
            "Value exceeds maximum size of {} bytes",
            MAX_VALUE_SIZE
        ));
    }
    None
}
