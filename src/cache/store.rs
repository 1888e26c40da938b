//! Cache Store Module
//!
//! Main cache engine: a concurrent key/entry map with lazy expiry and
//! atomic per-key compound operations.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::cache::{CacheConfiguration, CacheEntry, Clock, ExpiryDuration, ExpiryPolicy};
use crate::error::{CacheError, Result};
use crate::manager::{CacheManager, ManagerShared};

// == Cache ==
/// A named, thread-safe cache with pluggable expiry.
///
/// Single-key operations run against the key's map slot and never take the
/// store-wide lock. Bulk mutations (`put_all`, `remove_keys`, `remove_all`)
/// hold it for writing so they serialize against each other; `get_all`
/// holds it for reading. An entry observed expired is treated as absent by
/// every operation and dropped on the way.
pub struct Cache<K, V> {
    /// Name within the owning manager
    name: String,
    /// Private copy of the configuration the cache was created with
    configuration: CacheConfiguration<K, V>,
    /// Policy built once from the configured factory
    expiry_policy: Arc<dyn ExpiryPolicy>,
    /// Time source for stamping entries
    clock: Arc<dyn Clock>,
    /// Key-entry storage
    entries: DashMap<K, CacheEntry<V>>,
    /// Serializes bulk operations
    bulk_lock: RwLock<()>,
    closed: AtomicBool,
    manager: Weak<ManagerShared>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + 'static,
    V: Clone + PartialEq + 'static,
{
    // == Constructor ==
    /// Creates a standalone cache not tracked by any manager.
    pub fn new(name: impl Into<String>, configuration: &CacheConfiguration<K, V>) -> Self {
        Self::with_manager(name.into(), configuration, Weak::new())
    }

    pub(crate) fn with_manager(
        name: String,
        configuration: &CacheConfiguration<K, V>,
        manager: Weak<ManagerShared>,
    ) -> Self {
        let configuration = configuration.clone();
        let expiry_policy = configuration.expiry_policy_factory().create();
        let clock = Arc::clone(configuration.clock());

        debug!("Cache '{}' created with {:?}", name, expiry_policy);

        Self {
            name,
            configuration,
            expiry_policy,
            clock,
            entries: DashMap::new(),
            bulk_lock: RwLock::new(()),
            closed: AtomicBool::new(false),
            manager,
        }
    }

    // == Get ==
    /// Returns the value for `key` if present and unexpired.
    ///
    /// A hit records the access time, and renews the expiry when the
    /// policy defines an access duration.
    pub fn get(&self, key: &K) -> Result<Option<V>> {
        self.ensure_open()?;
        Ok(self.lookup(key, self.now()))
    }

    // == Get All ==
    /// Resolves each key independently; missing or expired keys are left
    /// out of the result.
    pub fn get_all<'a, I>(&self, keys: I) -> Result<HashMap<K, V>>
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        self.ensure_open()?;
        let _bulk = self.bulk_lock.read();

        let mut found = HashMap::new();
        for key in keys {
            if let Some(value) = self.lookup(key, self.now()) {
                found.insert(key.clone(), value);
            }
        }
        Ok(found)
    }

    // == Contains Key ==
    /// True iff `key` maps to an unexpired entry.
    pub fn contains_key(&self, key: &K) -> Result<bool> {
        self.ensure_open()?;
        let now = self.now();
        Ok(self
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now)))
    }

    // == Put ==
    /// Inserts or overwrites the value for `key`.
    ///
    /// New entries take the policy's creation duration; overwrites take its
    /// update duration.
    pub fn put(&self, key: K, value: V) -> Result<()> {
        self.ensure_open()?;
        self.upsert(key, value, self.now());
        self.ensure_open_after_write()
    }

    // == Get And Put ==
    /// Stores `value` and returns the value it replaced, if any.
    pub fn get_and_put(&self, key: K, value: V) -> Result<Option<V>> {
        self.ensure_open()?;
        let previous = self.upsert(key, value, self.now());
        self.ensure_open_after_write()?;
        Ok(previous)
    }

    // == Put All ==
    /// Puts every pair. Each put is atomic on its own; the batch is not.
    pub fn put_all<I>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.ensure_open()?;
        let bulk = self.bulk_lock.write();

        for (key, value) in entries {
            self.upsert(key, value, self.now());
        }
        drop(bulk);
        self.ensure_open_after_write()
    }

    // == Put If Absent ==
    /// Inserts only if `key` has no live entry. Returns whether it did.
    pub fn put_if_absent(&self, key: K, value: V) -> Result<bool> {
        self.ensure_open()?;
        let now = self.now();

        let inserted = match self.entries.entry(key) {
            Entry::Occupied(mut slot) => {
                if slot.get().is_expired_at(now) {
                    slot.insert(self.create_entry(value, now));
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(self.create_entry(value, now));
                true
            }
        };
        self.ensure_open_after_write()?;
        Ok(inserted)
    }

    // == Remove ==
    /// Deletes the entry for `key`. Returns whether a live entry was removed.
    pub fn remove(&self, key: &K) -> Result<bool> {
        self.ensure_open()?;
        let now = self.now();
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| !entry.is_expired_at(now)))
    }

    // == Remove If Equals ==
    /// Deletes the entry only if its value equals `expected`.
    pub fn remove_if_equals(&self, key: &K, expected: &V) -> Result<bool> {
        self.ensure_open()?;
        let now = self.now();

        // Expired entries are dropped too but don't count as a removal.
        let removed = self.entries.remove_if(key, |_, entry| {
            entry.is_expired_at(now) || entry.value_equals(expected)
        });
        Ok(removed.is_some_and(|(_, entry)| !entry.is_expired_at(now)))
    }

    // == Get And Remove ==
    /// Removes the entry for `key`, returning its value if it was live.
    pub fn get_and_remove(&self, key: &K) -> Result<Option<V>> {
        self.ensure_open()?;
        let now = self.now();
        Ok(self
            .entries
            .remove(key)
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(_, entry)| entry.into_value()))
    }

    // == Replace If Equals ==
    /// Overwrites only if the current value equals `expected`.
    pub fn replace_if_equals(&self, key: &K, expected: &V, value: V) -> Result<bool> {
        self.ensure_open()?;
        Ok(self
            .overwrite_existing(key, value, Some(expected), self.now())
            .is_some())
    }

    // == Replace ==
    /// Overwrites if `key` has a live entry. Returns whether it did.
    pub fn replace(&self, key: &K, value: V) -> Result<bool> {
        self.ensure_open()?;
        Ok(self.overwrite_existing(key, value, None, self.now()).is_some())
    }

    // == Get And Replace ==
    /// Overwrites if `key` has a live entry, returning the replaced value.
    pub fn get_and_replace(&self, key: &K, value: V) -> Result<Option<V>> {
        self.ensure_open()?;
        Ok(self.overwrite_existing(key, value, None, self.now()))
    }

    // == Remove Keys ==
    /// Deletes the entries for every key given.
    pub fn remove_keys<'a, I>(&self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        self.ensure_open()?;
        let _bulk = self.bulk_lock.write();

        for key in keys {
            self.entries.remove(key);
        }
        Ok(())
    }

    // == Remove All ==
    /// Deletes every entry.
    pub fn remove_all(&self) -> Result<()> {
        self.ensure_open()?;
        let _bulk = self.bulk_lock.write();
        self.entries.clear();
        Ok(())
    }

    // == Clear ==
    /// Same as `remove_all`.
    pub fn clear(&self) -> Result<()> {
        self.remove_all()
    }

    // == Purge Expired ==
    /// Drops every expired entry now instead of waiting for a read to
    /// notice it. Returns the number removed.
    pub fn purge_expired(&self) -> Result<usize> {
        self.ensure_open()?;
        let now = self.now();

        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let live = !entry.is_expired_at(now);
            if !live {
                removed += 1;
            }
            live
        });
        Ok(removed)
    }

    // == Length ==
    /// Number of stored entries, including expired ones not yet dropped.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn configuration(&self) -> &CacheConfiguration<K, V> {
        &self.configuration
    }

    /// The manager this cache is registered with, if it is still alive.
    pub fn cache_manager(&self) -> Option<CacheManager> {
        self.manager.upgrade().map(CacheManager::from_shared)
    }

    // == Close ==
    /// Closes the cache and releases it from its manager.
    ///
    /// Every later operation fails with `IllegalState`. Closing twice is a
    /// no-op.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(manager) = self.manager.upgrade() {
            manager.release(&self.name, self as *const Self as *const ());
        }
        let _bulk = self.bulk_lock.write();
        self.entries.clear();
        info!("Cache '{}' closed", self.name);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // == Internals ==

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(CacheError::cache_closed(&self.name));
        }
        Ok(())
    }

    /// Closes can land between `ensure_open` and an insert. Whatever the
    /// insert left behind is wiped so a closed cache stays empty.
    fn ensure_open_after_write(&self) -> Result<()> {
        if self.is_closed() {
            let _bulk = self.bulk_lock.write();
            self.entries.clear();
            return Err(CacheError::cache_closed(&self.name));
        }
        Ok(())
    }

    fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    fn create_entry(&self, value: V, now: u64) -> CacheEntry<V> {
        let expires_at = self.expiry_policy.expiry_for_creation().adjusted_time(now);
        CacheEntry::new(value, now, expires_at)
    }

    fn updated_expiry(&self, entry: &CacheEntry<V>, now: u64) -> Option<u64> {
        match self.expiry_policy.expiry_for_update() {
            Some(duration) => duration.adjusted_time(now),
            None => entry.expires_at(),
        }
    }

    /// Atomic insert-or-overwrite; returns the previous live value.
    fn upsert(&self, key: K, value: V, now: u64) -> Option<V> {
        match self.entries.entry(key) {
            Entry::Occupied(mut slot) => {
                if slot.get().is_expired_at(now) {
                    slot.insert(self.create_entry(value, now));
                    None
                } else {
                    let expires_at = self.updated_expiry(slot.get(), now);
                    Some(slot.get_mut().overwrite(value, now, expires_at))
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(self.create_entry(value, now));
                None
            }
        }
    }

    /// Overwrites a live entry, optionally only when it holds `expected`.
    /// Returns the replaced value when the overwrite happened.
    fn overwrite_existing(&self, key: &K, value: V, expected: Option<&V>, now: u64) -> Option<V> {
        {
            let mut entry = self.entries.get_mut(key)?;
            if !entry.is_expired_at(now) {
                if !expected.map_or(true, |expected| entry.value_equals(expected)) {
                    return None;
                }
                let expires_at = self.updated_expiry(&entry, now);
                return Some(entry.overwrite(value, now, expires_at));
            }
        }
        self.reap(key, now);
        None
    }

    fn lookup(&self, key: &K, now: u64) -> Option<V> {
        match self.expiry_policy.expiry_for_access() {
            None => self.read_shared(key, now),
            Some(duration) => self.read_and_renew(key, now, duration),
        }
    }

    fn read_shared(&self, key: &K, now: u64) -> Option<V> {
        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired_at(now) {
                return Some(entry.read(now));
            }
        }
        self.reap(key, now);
        None
    }

    fn read_and_renew(&self, key: &K, now: u64, duration: ExpiryDuration) -> Option<V> {
        {
            let mut entry = self.entries.get_mut(key)?;
            if !entry.is_expired_at(now) {
                entry.set_expires_at(duration.adjusted_time(now));
                return Some(entry.read(now));
            }
        }
        self.reap(key, now);
        None
    }

    /// Drops `key` if it is still expired. A concurrent writer may have
    /// replaced the entry since it was observed, so the check is repeated
    /// under the slot lock.
    fn reap(&self, key: &K, now: u64) {
        if self
            .entries
            .remove_if(key, |_, entry| entry.is_expired_at(now))
            .is_some()
        {
            debug!("Cache '{}': dropped expired entry", self.name);
        }
    }
}

impl<K, V> fmt::Debug for Cache<K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.name)
            .field("entries", &self.entries.len())
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ExpiryPolicyFactory, ManualClock};
    use std::time::Duration;

    const START: u64 = 1_000_000;

    fn eternal_cache() -> Cache<u32, String> {
        Cache::new("test", &CacheConfiguration::new())
    }

    fn cache_with(factory: ExpiryPolicyFactory) -> (Cache<u32, String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(START));
        let config = CacheConfiguration::new()
            .with_expiry_policy_factory(factory)
            .with_clock(clock.clone());
        (Cache::new("test", &config), clock)
    }

    fn word(i: u32) -> String {
        format!("word_{}", i)
    }

    #[test]
    fn test_get_missing_key() {
        let cache = eternal_cache();
        assert_eq!(cache.get(&1).unwrap(), None);
        assert!(!cache.contains_key(&1).unwrap());
    }

    #[test]
    fn test_put_and_get() {
        let cache = eternal_cache();
        cache.put(1, word(1)).unwrap();

        assert_eq!(cache.get(&1).unwrap(), Some(word(1)));
        assert!(cache.contains_key(&1).unwrap());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_overwrites() {
        let cache = eternal_cache();
        cache.put(1, "a".into()).unwrap();
        cache.put(1, "b".into()).unwrap();

        assert_eq!(cache.get(&1).unwrap(), Some("b".into()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_all_omits_missing_keys() {
        let cache = eternal_cache();
        cache.put(1, word(1)).unwrap();
        cache.put(2, word(2)).unwrap();

        let found = cache.get_all(&[1, 2, 3]).unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[&1], word(1));
        assert_eq!(found[&2], word(2));
        assert!(!found.contains_key(&3));
    }

    #[test]
    fn test_get_and_put_on_absent_key_still_stores() {
        let cache = eternal_cache();

        assert_eq!(cache.get_and_put(9, "first".into()).unwrap(), None);
        assert_eq!(cache.get(&9).unwrap(), Some("first".into()));

        assert_eq!(
            cache.get_and_put(9, "second".into()).unwrap(),
            Some("first".into())
        );
        assert_eq!(cache.get(&9).unwrap(), Some("second".into()));
    }

    #[test]
    fn test_put_all() {
        let cache = eternal_cache();
        cache.put_all((30..40).map(|i| (i, word(i)))).unwrap();

        for i in 30..40 {
            assert_eq!(cache.get(&i).unwrap(), Some(word(i)));
        }
    }

    #[test]
    fn test_put_if_absent() {
        let cache = eternal_cache();

        assert!(cache.put_if_absent(5, "a".into()).unwrap());
        assert_eq!(cache.get(&5).unwrap(), Some("a".into()));

        assert!(!cache.put_if_absent(5, "b".into()).unwrap());
        assert_eq!(cache.get(&5).unwrap(), Some("a".into()));
    }

    #[test]
    fn test_remove() {
        let cache = eternal_cache();
        cache.put(1, word(1)).unwrap();

        assert!(cache.remove(&1).unwrap());
        assert!(!cache.remove(&1).unwrap());
        assert!(!cache.contains_key(&1).unwrap());
    }

    #[test]
    fn test_remove_if_equals() {
        let cache = eternal_cache();
        cache.put(15, word(15)).unwrap();

        assert!(!cache.remove_if_equals(&15, &"newValue".into()).unwrap());
        assert!(cache.contains_key(&15).unwrap());

        assert!(cache.remove_if_equals(&15, &word(15)).unwrap());
        assert!(!cache.contains_key(&15).unwrap());
    }

    #[test]
    fn test_get_and_remove() {
        let cache = eternal_cache();
        cache.put(15, word(15)).unwrap();

        assert_eq!(cache.get_and_remove(&15).unwrap(), Some(word(15)));
        assert!(!cache.contains_key(&15).unwrap());
        assert_eq!(cache.get_and_remove(&15).unwrap(), None);
    }

    #[test]
    fn test_replace_if_equals_mismatch() {
        let cache = eternal_cache();
        cache.put(7, "other".into()).unwrap();

        assert!(!cache.replace_if_equals(&7, &"old".into(), "new".into()).unwrap());
        assert_eq!(cache.get(&7).unwrap(), Some("other".into()));
    }

    #[test]
    fn test_replace_if_equals_match() {
        let cache = eternal_cache();
        cache.put(7, "old".into()).unwrap();

        assert!(cache.replace_if_equals(&7, &"old".into(), "new".into()).unwrap());
        assert_eq!(cache.get(&7).unwrap(), Some("new".into()));
    }

    #[test]
    fn test_replace_requires_existing_entry() {
        let cache = eternal_cache();

        assert!(!cache.replace(&3, "x".into()).unwrap());
        assert!(!cache.contains_key(&3).unwrap());

        cache.put(3, "a".into()).unwrap();
        assert!(cache.replace(&3, "x".into()).unwrap());
        assert_eq!(cache.get(&3).unwrap(), Some("x".into()));
    }

    #[test]
    fn test_get_and_replace() {
        let cache = eternal_cache();

        assert_eq!(cache.get_and_replace(&3, "x".into()).unwrap(), None);
        assert!(!cache.contains_key(&3).unwrap());

        cache.put(3, "a".into()).unwrap();
        assert_eq!(
            cache.get_and_replace(&3, "b".into()).unwrap(),
            Some("a".into())
        );
        assert_eq!(cache.get(&3).unwrap(), Some("b".into()));
    }

    #[test]
    fn test_remove_keys() {
        let cache = eternal_cache();
        cache.put_all((0..10).map(|i| (i, word(i)))).unwrap();

        cache.remove_keys(&[1, 3, 5]).unwrap();

        assert_eq!(cache.len(), 7);
        assert!(!cache.contains_key(&3).unwrap());
        assert!(cache.contains_key(&4).unwrap());
    }

    #[test]
    fn test_remove_all_and_clear() {
        let cache = eternal_cache();
        cache.put_all((0..30).map(|i| (i, word(i)))).unwrap();
        cache.remove_all().unwrap();
        assert!(cache.is_empty());

        cache.put_all((0..30).map(|i| (i, word(i)))).unwrap();
        cache.clear().unwrap();
        for i in 0..30 {
            assert!(!cache.contains_key(&i).unwrap());
        }
    }

    #[test]
    fn test_creation_expiry() {
        let (cache, clock) = cache_with(ExpiryPolicyFactory::created(Duration::from_secs(10)));
        cache.put(1, "v".into()).unwrap();

        clock.advance(Duration::from_millis(9_999));
        assert_eq!(cache.get(&1).unwrap(), Some("v".into()));

        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.get(&1).unwrap(), None);
        // The read dropped the entry.
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_contains_key_respects_expiry() {
        let (cache, clock) = cache_with(ExpiryPolicyFactory::created(Duration::from_secs(1)));
        cache.put(1, "v".into()).unwrap();

        clock.advance(Duration::from_secs(1));

        assert!(!cache.contains_key(&1).unwrap());
        // Still physically stored until something reaps it.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_created_policy_ignores_updates() {
        let (cache, clock) = cache_with(ExpiryPolicyFactory::created(Duration::from_secs(10)));
        cache.put(1, "a".into()).unwrap();

        clock.advance(Duration::from_secs(5));
        cache.put(1, "b".into()).unwrap();

        clock.advance(Duration::from_secs(5));
        assert_eq!(cache.get(&1).unwrap(), None);
    }

    #[test]
    fn test_modified_policy_renews_on_update() {
        let (cache, clock) = cache_with(ExpiryPolicyFactory::modified(Duration::from_secs(10)));
        cache.put(1, "a".into()).unwrap();

        clock.advance(Duration::from_secs(5));
        assert!(cache.replace(&1, "b".into()).unwrap());

        clock.advance(Duration::from_secs(9));
        assert_eq!(cache.get(&1).unwrap(), Some("b".into()));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get(&1).unwrap(), None);
    }

    #[test]
    fn test_touched_policy_renews_on_read() {
        let (cache, clock) = cache_with(ExpiryPolicyFactory::touched(Duration::from_secs(10)));
        cache.put(1, "a".into()).unwrap();

        for _ in 0..5 {
            clock.advance(Duration::from_secs(8));
            assert_eq!(cache.get(&1).unwrap(), Some("a".into()));
        }

        clock.advance(Duration::from_secs(10));
        assert_eq!(cache.get(&1).unwrap(), None);
    }

    #[test]
    fn test_zero_creation_duration_is_immediately_expired() {
        let (cache, _clock) = cache_with(ExpiryPolicyFactory::created(ExpiryDuration::ZERO));
        cache.put(1, "v".into()).unwrap();

        assert_eq!(cache.get(&1).unwrap(), None);
    }

    #[test]
    fn test_expired_entry_counts_as_absent_for_writes() {
        let (cache, clock) = cache_with(ExpiryPolicyFactory::created(Duration::from_secs(1)));
        cache.put(1, "old".into()).unwrap();
        clock.advance(Duration::from_secs(2));

        assert!(!cache.replace(&1, "x".into()).unwrap());
        assert!(!cache.remove(&1).unwrap());

        cache.put(2, "old".into()).unwrap();
        clock.advance(Duration::from_secs(2));
        assert_eq!(cache.get_and_put(2, "new".into()).unwrap(), None);
        assert!(cache.put_if_absent(3, "v".into()).unwrap());

        cache.put(4, "old".into()).unwrap();
        clock.advance(Duration::from_secs(2));
        assert!(cache.put_if_absent(4, "fresh".into()).unwrap());
        assert_eq!(cache.get(&4).unwrap(), Some("fresh".into()));

        for key in 10..14 {
            cache.put(key, "old".into()).unwrap();
        }
        clock.advance(Duration::from_secs(2));

        assert!(!cache.remove_if_equals(&10, &"old".into()).unwrap());
        assert_eq!(cache.get_and_remove(&11).unwrap(), None);
        assert_eq!(cache.get_and_replace(&12, "new".into()).unwrap(), None);
        assert!(!cache
            .replace_if_equals(&13, &"old".into(), "new".into())
            .unwrap());
        for key in 10..14 {
            assert!(!cache.contains_key(&key).unwrap());
        }
        // The conditional writes dropped the stale entries on the way.
        assert!((10..14).all(|key| !cache.entries.contains_key(&key)));
    }

    #[test]
    fn test_entry_rewritten_after_expiry_gets_creation_lifetime() {
        let (cache, clock) = cache_with(ExpiryPolicyFactory::created(Duration::from_secs(10)));
        cache.put(1, "old".into()).unwrap();

        clock.advance(Duration::from_secs(10));
        cache.put(1, "new".into()).unwrap();

        clock.advance(Duration::from_secs(9));
        assert_eq!(cache.get(&1).unwrap(), Some("new".into()));
    }

    #[test]
    fn test_purge_expired() {
        let clock = Arc::new(ManualClock::new(START));
        let short = Cache::<u32, String>::new(
            "short",
            &CacheConfiguration::new()
                .with_expiry_policy_factory(ExpiryPolicyFactory::created(Duration::from_secs(1)))
                .with_clock(clock.clone()),
        );
        short.put_all((0..5).map(|i| (i, word(i)))).unwrap();
        clock.advance(Duration::from_secs(1));
        short.put(99, word(99)).unwrap();

        assert_eq!(short.purge_expired().unwrap(), 5);
        assert_eq!(short.len(), 1);
        assert_eq!(short.get(&99).unwrap(), Some(word(99)));
    }

    #[test]
    fn test_closed_cache_rejects_operations() {
        let cache = eternal_cache();
        cache.put(1, word(1)).unwrap();

        cache.close();
        cache.close();

        assert!(cache.is_closed());
        assert!(matches!(cache.get(&1), Err(CacheError::IllegalState(_))));
        assert!(matches!(
            cache.put(2, word(2)),
            Err(CacheError::IllegalState(_))
        ));
        assert!(matches!(cache.clear(), Err(CacheError::IllegalState(_))));
    }

    #[test]
    fn test_close_racing_writers_leaves_cache_empty() {
        use std::thread;

        for _round in 0..20 {
            let cache = Arc::new(eternal_cache());
            let writers: Vec<_> = (0..4u32)
                .map(|t| {
                    let cache = Arc::clone(&cache);
                    thread::spawn(move || {
                        let mut i = 0;
                        while cache.put(t * 100_000 + i, word(i)).is_ok() {
                            i += 1;
                        }
                    })
                })
                .collect();

            thread::sleep(Duration::from_millis(2));
            cache.close();
            for handle in writers {
                handle.join().unwrap();
            }

            assert!(cache.is_empty());
        }
    }

    #[test]
    fn test_standalone_cache_has_no_manager() {
        let cache = eternal_cache();
        assert!(cache.cache_manager().is_none());
        assert_eq!(cache.name(), "test");
    }
}
