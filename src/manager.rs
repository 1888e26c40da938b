//! Cache Manager Module
//!
//! Registry of named caches with explicit create/destroy/close lifecycle.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::cache::{Cache, CacheConfiguration, TypeDescriptor};
use crate::error::{CacheError, Result};

// == Managed Cache ==
/// Type-erased view of a `Cache<K, V>` held by the registry.
pub trait ManagedCache: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Declared key type.
    fn key_type(&self) -> TypeDescriptor;

    /// Declared value type.
    fn value_type(&self) -> TypeDescriptor;

    /// Drops expired entries, returning how many were removed.
    fn purge_expired(&self) -> usize;

    fn close(&self);

    fn is_closed(&self) -> bool;

    /// Recovers the concrete cache for a typed downcast.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<K, V> ManagedCache for Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + PartialEq + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        Cache::name(self)
    }

    fn key_type(&self) -> TypeDescriptor {
        self.configuration().key_type()
    }

    fn value_type(&self) -> TypeDescriptor {
        self.configuration().value_type()
    }

    fn purge_expired(&self) -> usize {
        // Closed caches have nothing left to purge.
        Cache::purge_expired(self).unwrap_or(0)
    }

    fn close(&self) {
        Cache::close(self)
    }

    fn is_closed(&self) -> bool {
        Cache::is_closed(self)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

// == Shared State ==
/// State shared by every `CacheManager` handle and referenced weakly by the
/// caches it created.
#[derive(Default)]
pub(crate) struct ManagerShared {
    caches: Mutex<HashMap<String, Arc<dyn ManagedCache>>>,
    closed: AtomicBool,
}

impl ManagerShared {
    /// Unregisters `name` without closing it, but only while it still maps
    /// to the cache at `cache`. A name destroyed and then reused by another
    /// cache stays registered to the newcomer.
    pub(crate) fn release(&self, name: &str, cache: *const ()) {
        let mut caches = self.caches.lock();
        let registered = caches
            .get(name)
            .is_some_and(|current| Arc::as_ptr(current) as *const () == cache);
        if registered {
            caches.remove(name);
            debug!("Cache '{}' released from manager", name);
        }
    }
}

// == Cache Manager ==
/// Owns named caches.
///
/// Cloning yields another handle to the same registry. Every operation
/// fails with `IllegalState` once the manager is closed.
#[derive(Clone, Default)]
pub struct CacheManager {
    shared: Arc<ManagerShared>,
}

impl CacheManager {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_shared(shared: Arc<ManagerShared>) -> Self {
        Self { shared }
    }

    // == Create Cache ==
    /// Creates and registers a cache under `name`.
    ///
    /// # Errors
    /// - `InvalidArgument` if `name` is empty
    /// - `AlreadyExists` if the name is taken
    /// - `IllegalState` if the manager is closed
    pub fn create_cache<K, V>(
        &self,
        name: &str,
        configuration: &CacheConfiguration<K, V>,
    ) -> Result<Arc<Cache<K, V>>>
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        V: Clone + PartialEq + Send + Sync + 'static,
    {
        self.ensure_open()?;
        if name.is_empty() {
            return Err(CacheError::InvalidArgument(
                "cache name must not be empty".to_string(),
            ));
        }

        let mut caches = self.shared.caches.lock();
        // Re-checked under the lock so a concurrent close can't strand the cache.
        self.ensure_open()?;
        if caches.contains_key(name) {
            return Err(CacheError::AlreadyExists(name.to_string()));
        }

        let cache = Arc::new(Cache::with_manager(
            name.to_string(),
            configuration,
            Arc::downgrade(&self.shared),
        ));
        let managed: Arc<dyn ManagedCache> = cache.clone();
        caches.insert(name.to_string(), managed);

        info!(
            "Cache '{}' created: key_type={}, value_type={}",
            name,
            configuration.key_type(),
            configuration.value_type()
        );
        Ok(cache)
    }

    // == Get Cache ==
    /// Looks up a cache by name, checking its declared types.
    ///
    /// Returns `Ok(None)` for an unknown name and `TypeMismatch` when `K` or
    /// `V` differ from the types the cache was created with.
    pub fn get_cache<K, V>(&self, name: &str) -> Result<Option<Arc<Cache<K, V>>>>
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        V: Clone + PartialEq + Send + Sync + 'static,
    {
        self.ensure_open()?;

        let managed = match self.shared.caches.lock().get(name) {
            Some(cache) => Arc::clone(cache),
            None => return Ok(None),
        };

        check_type("key", managed.key_type(), TypeDescriptor::of::<K>())?;
        check_type("value", managed.value_type(), TypeDescriptor::of::<V>())?;

        managed
            .into_any()
            .downcast::<Cache<K, V>>()
            .map(Some)
            .map_err(|_| CacheError::Internal(format!("cache '{}' failed to downcast", name)))
    }

    // == Cache Names ==
    /// Names of all registered caches, sorted.
    pub fn cache_names(&self) -> Result<Vec<String>> {
        self.ensure_open()?;
        let mut names: Vec<String> = self.shared.caches.lock().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    // == Destroy Cache ==
    /// Unregisters and closes the named cache. Unknown names are ignored.
    pub fn destroy_cache(&self, name: &str) -> Result<()> {
        self.ensure_open()?;
        if name.is_empty() {
            return Err(CacheError::InvalidArgument(
                "cache name must not be empty".to_string(),
            ));
        }

        let removed = self.shared.caches.lock().remove(name);
        if let Some(cache) = removed {
            cache.close();
            info!("Cache '{}' destroyed", name);
        }
        Ok(())
    }

    // == Purge Expired ==
    /// Sweeps expired entries from every registered cache.
    ///
    /// Returns the total number of entries removed.
    pub fn purge_expired(&self) -> Result<usize> {
        self.ensure_open()?;
        let caches: Vec<Arc<dyn ManagedCache>> =
            self.shared.caches.lock().values().cloned().collect();

        Ok(caches.iter().map(|cache| cache.purge_expired()).sum())
    }

    // == Close ==
    /// Closes every cache and the manager itself. Idempotent.
    pub fn close(&self) {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        let caches: Vec<Arc<dyn ManagedCache>> = self
            .shared
            .caches
            .lock()
            .drain()
            .map(|(_, cache)| cache)
            .collect();

        for cache in &caches {
            cache.close();
        }
        info!("Cache manager closed ({} caches released)", caches.len());
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(CacheError::manager_closed());
        }
        Ok(())
    }
}

impl fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheManager")
            .field("caches", &self.shared.caches.lock().len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn check_type(
    kind: &'static str,
    expected: TypeDescriptor,
    requested: TypeDescriptor,
) -> Result<()> {
    if expected != requested {
        return Err(CacheError::TypeMismatch {
            kind,
            expected: expected.name(),
            requested: requested.name(),
        });
    }
    Ok(())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ExpiryPolicyFactory, ManualClock};
    use std::time::Duration;

    fn config() -> CacheConfiguration<u32, String> {
        CacheConfiguration::new()
    }

    #[test]
    fn test_create_and_get_cache() {
        let manager = CacheManager::new();
        let created = manager.create_cache("simpleCache", &config()).unwrap();
        created.put(1, "one".into()).unwrap();

        let found = manager
            .get_cache::<u32, String>("simpleCache")
            .unwrap()
            .expect("cache should be registered");

        assert!(Arc::ptr_eq(&created, &found));
        assert_eq!(found.get(&1).unwrap(), Some("one".into()));
        assert!(found.cache_manager().is_some());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let manager = CacheManager::new();
        manager.create_cache("dup", &config()).unwrap();

        let err = manager.create_cache("dup", &config()).unwrap_err();
        assert_eq!(err, CacheError::AlreadyExists("dup".into()));
    }

    #[test]
    fn test_empty_name_rejected() {
        let manager = CacheManager::new();
        assert!(matches!(
            manager.create_cache("", &config()),
            Err(CacheError::InvalidArgument(_))
        ));
        assert!(matches!(
            manager.destroy_cache(""),
            Err(CacheError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_get_unknown_cache() {
        let manager = CacheManager::new();
        assert!(manager.get_cache::<u32, String>("nope").unwrap().is_none());
    }

    #[test]
    fn test_get_cache_type_mismatch() {
        let manager = CacheManager::new();
        manager.create_cache("typed", &config()).unwrap();

        match manager.get_cache::<u64, String>("typed") {
            Err(CacheError::TypeMismatch { kind, expected, requested }) => {
                assert_eq!(kind, "key");
                assert_eq!(expected, "u32");
                assert_eq!(requested, "u64");
            }
            other => panic!("expected key mismatch, got {:?}", other),
        }

        match manager.get_cache::<u32, u32>("typed") {
            Err(CacheError::TypeMismatch { kind, .. }) => assert_eq!(kind, "value"),
            other => panic!("expected value mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_cache_names_sorted() {
        let manager = CacheManager::new();
        manager.create_cache("b", &config()).unwrap();
        manager.create_cache("a", &config()).unwrap();

        assert_eq!(manager.cache_names().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_destroy_cache_closes_and_unregisters() {
        let manager = CacheManager::new();
        let cache = manager.create_cache("gone", &config()).unwrap();

        manager.destroy_cache("gone").unwrap();

        assert!(cache.is_closed());
        assert!(manager.get_cache::<u32, String>("gone").unwrap().is_none());
        // Name is free again.
        manager.create_cache("gone", &config()).unwrap();
        // Unknown names are fine.
        manager.destroy_cache("never-existed").unwrap();
    }

    #[test]
    fn test_closing_cache_releases_name() {
        let manager = CacheManager::new();
        let cache = manager.create_cache("released", &config()).unwrap();

        cache.close();

        assert!(manager.cache_names().unwrap().is_empty());
        manager.create_cache("released", &config()).unwrap();
    }

    #[test]
    fn test_stale_close_keeps_replacement_registered() {
        let manager = CacheManager::new();
        let stale = manager.create_cache("x", &config()).unwrap();

        // Interleaving of destroy_cache: unregistered, not yet closed.
        manager.shared.caches.lock().remove("x");
        let replacement = manager.create_cache("x", &config()).unwrap();
        stale.close();

        let found = manager.get_cache::<u32, String>("x").unwrap().unwrap();
        assert!(Arc::ptr_eq(&replacement, &found));
        assert!(!replacement.is_closed());
    }

    #[test]
    fn test_destroy_racing_create_leaves_no_orphans() {
        use std::thread;

        let manager = CacheManager::new();
        let creators: Vec<_> = (0..4)
            .map(|_| {
                let manager = manager.clone();
                thread::spawn(move || {
                    (0..300)
                        .filter_map(|_| manager.create_cache("x", &config()).ok())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let destroyers: Vec<_> = (0..4)
            .map(|_| {
                let manager = manager.clone();
                thread::spawn(move || {
                    for _ in 0..300 {
                        manager.destroy_cache("x").unwrap();
                    }
                })
            })
            .collect();

        for handle in destroyers {
            handle.join().unwrap();
        }
        let created: Vec<Arc<Cache<u32, String>>> = creators
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        // Every open cache must be the one registered under the name.
        let registered = manager.get_cache::<u32, String>("x").unwrap();
        for cache in created.iter().filter(|c| !c.is_closed()) {
            let current = registered.as_ref().expect("open cache must be registered");
            assert!(Arc::ptr_eq(cache, current));
        }
    }

    #[test]
    fn test_close_manager() {
        let manager = CacheManager::new();
        let a = manager.create_cache("a", &config()).unwrap();
        let b = manager.create_cache("b", &config()).unwrap();

        manager.close();
        manager.close();

        assert!(manager.is_closed());
        assert!(a.is_closed() && b.is_closed());
        assert!(matches!(
            manager.create_cache("c", &config()),
            Err(CacheError::IllegalState(_))
        ));
        assert!(matches!(
            manager.get_cache::<u32, String>("a"),
            Err(CacheError::IllegalState(_))
        ));
        assert!(matches!(manager.cache_names(), Err(CacheError::IllegalState(_))));
        assert!(matches!(
            manager.destroy_cache("a"),
            Err(CacheError::IllegalState(_))
        ));
    }

    #[test]
    fn test_purge_expired_across_caches() {
        let clock = Arc::new(ManualClock::new(10_000));
        let short = CacheConfiguration::<u32, String>::new()
            .with_expiry_policy_factory(ExpiryPolicyFactory::created(Duration::from_secs(1)))
            .with_clock(clock.clone());

        let manager = CacheManager::new();
        let first = manager.create_cache("first", &short).unwrap();
        let second = manager.create_cache("second", &short).unwrap();
        let eternal = manager.create_cache("eternal", &config()).unwrap();

        first.put(1, "a".into()).unwrap();
        second.put(1, "b".into()).unwrap();
        second.put(2, "c".into()).unwrap();
        eternal.put(1, "d".into()).unwrap();

        clock.advance(Duration::from_secs(1));

        assert_eq!(manager.purge_expired().unwrap(), 3);
        assert_eq!(eternal.len(), 1);
    }
}
