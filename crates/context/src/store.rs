//! Value stores - where injection descriptors look up their binding keys
//!
//! The resolver only ever calls [`ValueStore::get_value_or_promise`]. [`Context`]
//! is the flat, thread-safe store shipped with the crate; hierarchies and
//! caching scopes belong to whoever wraps it.

use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::binding::{downcast, Binding, BoundValue};
use crate::errors::{ContextError, Result};
use crate::value_or_promise::ValueOrPromise;

/// Keyed source of values for injection resolution
pub trait ValueStore: Send + Sync {
    /// Get the value bound to `key`, immediately or as a promise.
    ///
    /// Lookup failures are returned as the synchronous `Err`; failures of
    /// asynchronous sources travel through the promise.
    fn get_value_or_promise(&self, key: &str) -> Result<ValueOrPromise<BoundValue>>;

    /// Keys of all bindings carrying `tag`. Used by tag-based resolver
    /// functions, never by the resolver itself.
    fn find_keys_by_tag(&self, _tag: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Flat binding registry
#[derive(Clone)]
pub struct Context {
    name: String,
    registry: Arc<RwLock<HashMap<String, Binding>>>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a binding, returning the one it replaced
    pub fn bind(&self, binding: Binding) -> Option<Binding> {
        let key = binding.key().to_string();
        let replaced = self.registry.write().insert(key.clone(), binding);

        if replaced.is_some() {
            warn!(context = %self.name, key = %key, "binding replaced");
        } else {
            debug!(context = %self.name, key = %key, "binding registered");
        }
        replaced
    }

    pub fn contains(&self, key: &str) -> bool {
        self.registry.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.read().is_empty()
    }

    /// Snapshot of the binding for `key`
    pub fn binding(&self, key: &str) -> Option<Binding> {
        self.registry.read().get(key).cloned()
    }

    /// All bindings carrying `tag`, sorted by key
    pub fn find_by_tag(&self, tag: &str) -> Vec<Binding> {
        let mut found: Vec<Binding> = self
            .registry
            .read()
            .values()
            .filter(|binding| binding.has_tag(tag))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.key().cmp(b.key()));
        found
    }

    /// Resolve `key` and downcast, awaiting if the binding is asynchronous
    pub async fn get<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>> {
        let value = self.get_value_or_promise(key)?.resolve().await?;
        downcast(value, &self.name, key)
    }

    /// Resolve `key` and downcast, refusing asynchronous bindings
    pub fn get_sync<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>> {
        match self.get_value_or_promise(key)? {
            ValueOrPromise::Value(value) => downcast(value, &self.name, key),
            ValueOrPromise::Promise(_) => Err(ContextError::SyncGetOnPromise {
                key: key.to_string(),
            }),
        }
    }
}

impl ValueStore for Context {
    fn get_value_or_promise(&self, key: &str) -> Result<ValueOrPromise<BoundValue>> {
        // Clone out of the lock: class bindings resolve back into this store.
        let binding = self
            .binding(key)
            .ok_or_else(|| ContextError::KeyNotBound {
                key: key.to_string(),
            })?;
        binding.get_value(self)
    }

    fn find_keys_by_tag(&self, tag: &str) -> Vec<String> {
        self.find_by_tag(tag)
            .iter()
            .map(|binding| binding.key().to_string())
            .collect()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("name", &self.name)
            .field("bindings", &self.len())
            .finish()
    }
}
