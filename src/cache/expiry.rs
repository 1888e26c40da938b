//! Expiry Policy Module
//!
//! Pluggable policies deciding how long an entry lives after it is created,
//! updated or accessed.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// == Expiry Duration ==
/// How long an entry stays fresh after a lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryDuration {
    /// Never expires.
    Eternal,
    /// Expires once the duration has elapsed.
    Finite(Duration),
}

impl ExpiryDuration {
    /// An entry with this duration is already expired when stamped.
    pub const ZERO: ExpiryDuration = ExpiryDuration::Finite(Duration::ZERO);

    /// Returns the absolute expiry time for an event happening at `now_ms`,
    /// or `None` when the entry never expires.
    pub fn adjusted_time(&self, now_ms: u64) -> Option<u64> {
        match self {
            ExpiryDuration::Eternal => None,
            ExpiryDuration::Finite(d) => {
                let ms = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
                Some(now_ms.saturating_add(ms))
            }
        }
    }

    /// Returns true for `Eternal`.
    pub fn is_eternal(&self) -> bool {
        matches!(self, ExpiryDuration::Eternal)
    }
}

impl From<Duration> for ExpiryDuration {
    fn from(d: Duration) -> Self {
        ExpiryDuration::Finite(d)
    }
}

// == Expiry Policy ==
/// Computes entry lifetimes.
///
/// Returning `None` from the update or access hooks leaves the entry's
/// current expiry untouched. Policies are shared read-only between all
/// callers of a cache.
pub trait ExpiryPolicy: Send + Sync + fmt::Debug {
    /// Lifetime of a newly created entry.
    fn expiry_for_creation(&self) -> ExpiryDuration;

    /// Lifetime after the value of an existing entry is replaced.
    fn expiry_for_update(&self) -> Option<ExpiryDuration>;

    /// Lifetime after an entry is read.
    fn expiry_for_access(&self) -> Option<ExpiryDuration>;
}

/// Entries never expire.
#[derive(Debug, Default, Clone, Copy)]
pub struct EternalExpiryPolicy;

impl ExpiryPolicy for EternalExpiryPolicy {
    fn expiry_for_creation(&self) -> ExpiryDuration {
        ExpiryDuration::Eternal
    }

    fn expiry_for_update(&self) -> Option<ExpiryDuration> {
        None
    }

    fn expiry_for_access(&self) -> Option<ExpiryDuration> {
        None
    }
}

/// Fixed lifetime counted from creation; updates and reads don't extend it.
#[derive(Debug, Clone, Copy)]
pub struct CreatedExpiryPolicy(pub ExpiryDuration);

impl ExpiryPolicy for CreatedExpiryPolicy {
    fn expiry_for_creation(&self) -> ExpiryDuration {
        self.0
    }

    fn expiry_for_update(&self) -> Option<ExpiryDuration> {
        None
    }

    fn expiry_for_access(&self) -> Option<ExpiryDuration> {
        None
    }
}

/// Lifetime renewed on creation and on every read.
#[derive(Debug, Clone, Copy)]
pub struct AccessedExpiryPolicy(pub ExpiryDuration);

impl ExpiryPolicy for AccessedExpiryPolicy {
    fn expiry_for_creation(&self) -> ExpiryDuration {
        self.0
    }

    fn expiry_for_update(&self) -> Option<ExpiryDuration> {
        None
    }

    fn expiry_for_access(&self) -> Option<ExpiryDuration> {
        Some(self.0)
    }
}

/// Lifetime renewed on creation and on every write.
#[derive(Debug, Clone, Copy)]
pub struct ModifiedExpiryPolicy(pub ExpiryDuration);

impl ExpiryPolicy for ModifiedExpiryPolicy {
    fn expiry_for_creation(&self) -> ExpiryDuration {
        self.0
    }

    fn expiry_for_update(&self) -> Option<ExpiryDuration> {
        Some(self.0)
    }

    fn expiry_for_access(&self) -> Option<ExpiryDuration> {
        None
    }
}

/// Lifetime renewed on creation, every write and every read.
#[derive(Debug, Clone, Copy)]
pub struct TouchedExpiryPolicy(pub ExpiryDuration);

impl ExpiryPolicy for TouchedExpiryPolicy {
    fn expiry_for_creation(&self) -> ExpiryDuration {
        self.0
    }

    fn expiry_for_update(&self) -> Option<ExpiryDuration> {
        Some(self.0)
    }

    fn expiry_for_access(&self) -> Option<ExpiryDuration> {
        Some(self.0)
    }
}

// == Expiry Policy Factory ==
type PolicyFn = dyn Fn() -> Arc<dyn ExpiryPolicy> + Send + Sync;

/// Produces the expiry policy a cache uses for its whole life.
///
/// Cloning the factory is cheap; the cache calls it once at construction.
#[derive(Clone)]
pub struct ExpiryPolicyFactory {
    make: Arc<PolicyFn>,
}

impl ExpiryPolicyFactory {
    /// Wraps an arbitrary constructor.
    pub fn from_fn<F>(make: F) -> Self
    where
        F: Fn() -> Arc<dyn ExpiryPolicy> + Send + Sync + 'static,
    {
        Self {
            make: Arc::new(make),
        }
    }

    /// Factory for a policy that is cheap to copy.
    pub fn of<P>(policy: P) -> Self
    where
        P: ExpiryPolicy + Clone + 'static,
    {
        Self::from_fn(move || -> Arc<dyn ExpiryPolicy> { Arc::new(policy.clone()) })
    }

    pub fn eternal() -> Self {
        Self::of(EternalExpiryPolicy)
    }

    pub fn created(ttl: impl Into<ExpiryDuration>) -> Self {
        Self::of(CreatedExpiryPolicy(ttl.into()))
    }

    pub fn accessed(ttl: impl Into<ExpiryDuration>) -> Self {
        Self::of(AccessedExpiryPolicy(ttl.into()))
    }

    pub fn modified(ttl: impl Into<ExpiryDuration>) -> Self {
        Self::of(ModifiedExpiryPolicy(ttl.into()))
    }

    pub fn touched(ttl: impl Into<ExpiryDuration>) -> Self {
        Self::of(TouchedExpiryPolicy(ttl.into()))
    }

    /// Builds a policy instance.
    pub fn create(&self) -> Arc<dyn ExpiryPolicy> {
        (self.make)()
    }
}

impl Default for ExpiryPolicyFactory {
    fn default() -> Self {
        Self::eternal()
    }
}

impl fmt::Debug for ExpiryPolicyFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Building a policy would run caller code.
        f.debug_struct("ExpiryPolicyFactory").finish_non_exhaustive()
    }
}

// == Expiry Policy Kind ==
/// Serializable description of one of the stock policies.
///
/// Used by the HTTP layer and environment configuration, where a closure
/// can't be passed around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ExpiryPolicyKind {
    Eternal,
    Created { ttl_secs: u64 },
    Accessed { ttl_secs: u64 },
    Modified { ttl_secs: u64 },
    Touched { ttl_secs: u64 },
}

impl ExpiryPolicyKind {
    /// Turns the description into a factory.
    pub fn factory(&self) -> ExpiryPolicyFactory {
        let secs = |s: u64| Duration::from_secs(s);
        match *self {
            ExpiryPolicyKind::Eternal => ExpiryPolicyFactory::eternal(),
            ExpiryPolicyKind::Created { ttl_secs } => ExpiryPolicyFactory::created(secs(ttl_secs)),
            ExpiryPolicyKind::Accessed { ttl_secs } => {
                ExpiryPolicyFactory::accessed(secs(ttl_secs))
            }
            ExpiryPolicyKind::Modified { ttl_secs } => {
                ExpiryPolicyFactory::modified(secs(ttl_secs))
            }
            ExpiryPolicyKind::Touched { ttl_secs } => ExpiryPolicyFactory::touched(secs(ttl_secs)),
        }
    }
}
