//! TCache - A thread-safe in-process key/value cache
//!
//! Provides named caches with pluggable expiry policies, atomic per-key
//! compound operations, and an optional HTTP front end.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod manager;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, CacheConfiguration, ExpiryPolicyFactory};
pub use config::Config;
pub use error::{CacheError, Result};
pub use manager::CacheManager;
pub use tasks::spawn_cleanup_task;
