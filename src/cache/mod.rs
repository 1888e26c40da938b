//! Cache Module
//!
//! Provides thread-safe in-memory caches with pluggable expiry policies.

mod clock;
mod configuration;
mod entry;
mod expiry;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use configuration::{CacheConfiguration, TypeDescriptor};
pub use entry::CacheEntry;
pub use expiry::{
    AccessedExpiryPolicy, CreatedExpiryPolicy, EternalExpiryPolicy, ExpiryDuration,
    ExpiryPolicy, ExpiryPolicyFactory, ExpiryPolicyKind, ModifiedExpiryPolicy,
    TouchedExpiryPolicy,
};
pub use store::Cache;
