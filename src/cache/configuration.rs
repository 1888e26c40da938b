//! Cache Configuration Module
//!
//! The settings bundle a cache is created from.

use std::any::{type_name, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::cache::{Clock, ExpiryPolicyFactory, SystemClock};

// == Type Descriptor ==
/// Runtime identity of a key or value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// == Cache Configuration ==
/// Configuration for a `Cache<K, V>`.
///
/// Key and value types come from the generic parameters. The cache keeps
/// its own clone, so a bundle can be reused for several caches.
pub struct CacheConfiguration<K, V> {
    /// Declared only; values are always stored as given.
    store_by_value: bool,
    expiry_policy_factory: ExpiryPolicyFactory,
    clock: Arc<dyn Clock>,
    _types: PhantomData<fn() -> (K, V)>,
}

impl<K: 'static, V: 'static> CacheConfiguration<K, V> {
    /// Store-by-value, eternal entries, wall-clock time.
    pub fn new() -> Self {
        Self {
            store_by_value: true,
            expiry_policy_factory: ExpiryPolicyFactory::default(),
            clock: Arc::new(SystemClock),
            _types: PhantomData,
        }
    }

    pub fn with_store_by_value(mut self, store_by_value: bool) -> Self {
        self.store_by_value = store_by_value;
        self
    }

    pub fn with_expiry_policy_factory(mut self, factory: ExpiryPolicyFactory) -> Self {
        self.expiry_policy_factory = factory;
        self
    }

    /// Replaces the time source, mostly for tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_store_by_value(&self) -> bool {
        self.store_by_value
    }

    pub fn expiry_policy_factory(&self) -> &ExpiryPolicyFactory {
        &self.expiry_policy_factory
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn key_type(&self) -> TypeDescriptor {
        TypeDescriptor::of::<K>()
    }

    pub fn value_type(&self) -> TypeDescriptor {
        TypeDescriptor::of::<V>()
    }
}

impl<K: 'static, V: 'static> Default for CacheConfiguration<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual impl: K and V need not be Clone themselves.
impl<K, V> Clone for CacheConfiguration<K, V> {
    fn clone(&self) -> Self {
        Self {
            store_by_value: self.store_by_value,
            expiry_policy_factory: self.expiry_policy_factory.clone(),
            clock: Arc::clone(&self.clock),
            _types: PhantomData,
        }
    }
}

impl<K: 'static, V: 'static> fmt::Debug for CacheConfiguration<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfiguration")
            .field("key_type", &self.key_type().name())
            .field("value_type", &self.value_type().name())
            .field("store_by_value", &self.store_by_value)
            .field("expiry_policy_factory", &self.expiry_policy_factory)
            .field("clock", &self.clock)
            .finish()
    }
}
