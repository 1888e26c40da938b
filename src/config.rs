//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

use crate::cache::ExpiryPolicyKind;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in seconds for caches created without an explicit policy;
    /// 0 means entries never expire
    pub default_ttl: u64,
    /// Name of the cache created at startup
    pub default_cache: String,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `DEFAULT_CACHE` - Cache created at startup (default: "default")
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: parse_var("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            default_cache: env::var("DEFAULT_CACHE")
                .ok()
                .filter(|name| !name.is_empty())
                .unwrap_or(defaults.default_cache),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Expiry policy applied when a cache is created without one: entries
    /// live `default_ttl` seconds past their last access or write.
    pub fn default_expiry(&self) -> ExpiryPolicyKind {
        if self.default_ttl == 0 {
            ExpiryPolicyKind::Eternal
        } else {
            ExpiryPolicyKind::Touched {
                ttl_secs: self.default_ttl,
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: 300,
            default_cache: "default".to_string(),
            server_port: 3000,
            cleanup_interval: 1,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
