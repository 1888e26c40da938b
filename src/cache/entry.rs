//! Cache Entry Module
//!
//! Defines the versioned value envelope stored under each key.

use std::sync::atomic::{AtomicU64, Ordering};

// == Cache Entry ==
/// A stored value plus its timing metadata.
///
/// All timestamps are Unix milliseconds. `expires_at == None` means the
/// entry never expires; otherwise `expires_at >= created_at`.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// The stored value
    value: V,
    /// Creation timestamp, fixed for the life of the entry
    created_at: u64,
    /// Timestamp of the last value replacement
    modified_at: u64,
    /// Timestamp of the last successful read; concurrent readers race on
    /// it and the last store wins
    accessed_at: AtomicU64,
    /// Expiration timestamp, None = no expiration
    expires_at: Option<u64>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry stamped at `now`.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `now` - Creation time
    /// * `expires_at` - Absolute expiry computed by the owning cache
    pub fn new(value: V, now: u64, expires_at: Option<u64>) -> Self {
        Self {
            value,
            created_at: now,
            modified_at: now,
            accessed_at: AtomicU64::new(now),
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry is stale at `now`.
    ///
    /// Boundary condition: an entry is expired once `now` reaches the
    /// expiration time, so a zero lifetime is expired immediately.
    pub fn is_expired_at(&self, now: u64) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Read ==
    /// Returns the value and records the access time.
    pub fn read(&self, now: u64) -> V
    where
        V: Clone,
    {
        self.accessed_at.store(now, Ordering::Relaxed);
        self.value.clone()
    }

    // == Overwrite ==
    /// Replaces the value, returning the previous one.
    ///
    /// Requires exclusive access to the entry, which the owning cache
    /// provides through the key's map slot.
    pub fn overwrite(&mut self, value: V, now: u64, expires_at: Option<u64>) -> V {
        self.modified_at = now;
        self.expires_at = expires_at;
        std::mem::replace(&mut self.value, value)
    }

    /// Moves the expiration time without touching the value.
    pub fn set_expires_at(&mut self, expires_at: Option<u64>) {
        self.expires_at = expires_at;
    }

    // == Value Equals ==
    /// Compares the stored value with `candidate`.
    pub fn value_equals(&self, candidate: &V) -> bool
    where
        V: PartialEq,
    {
        self.value == *candidate
    }

    /// Consumes the entry, yielding the value without stamping an access.
    pub fn into_value(self) -> V {
        self.value
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn modified_at(&self) -> u64 {
        self.modified_at
    }

    pub fn accessed_at(&self) -> u64 {
        self.accessed_at.load(Ordering::Relaxed)
    }

    pub fn expires_at(&self) -> Option<u64> {
        self.expires_at
    }
}
