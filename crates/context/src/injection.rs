//! Injection descriptors and the targets that declare them
//!
//! An [`Injection`] says how one parameter or property gets its value: either a
//! binding key looked up in the store, or a custom resolver function. Targets
//! expose their declarations through [`DescribeInjections`]; [`InjectionTarget`]
//! is the explicit-registration implementation used for plain functions and
//! as the metadata half of [`crate::Class`].

use futures::future::{try_join_all, FutureExt};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::binding::{bound, Binding, BoundValue};
use crate::errors::Result;
use crate::store::ValueStore;
use crate::value_or_promise::ValueOrPromise;

/// Custom resolution hook. Receives the store and the per-call copy of the
/// descriptor (with the owning binding attached).
pub type ResolverFn =
    Arc<dyn Fn(&dyn ValueStore, &Injection) -> Result<ValueOrPromise<BoundValue>> + Send + Sync>;

/// Declared dependency of one parameter or property
#[derive(Clone, Default)]
pub struct Injection {
    /// Key looked up in the store when no resolver function is present
    pub binding_key: Option<String>,
    /// Custom resolver; takes precedence over `binding_key`
    pub resolve: Option<ResolverFn>,
    /// Opaque data for resolver functions
    pub metadata: Option<serde_json::Value>,
    binding: Option<Binding>,
}

impl Injection {
    /// Inject the value bound to `key`
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            binding_key: Some(key.into()),
            ..Self::default()
        }
    }

    /// Inject whatever `resolve` produces
    pub fn with_resolver<F>(resolve: F) -> Self
    where
        F: Fn(&dyn ValueStore, &Injection) -> Result<ValueOrPromise<BoundValue>>
            + Send
            + Sync
            + 'static,
    {
        Self::default().resolver(resolve)
    }

    /// Inject a `Vec<BoundValue>` holding every binding tagged with `tag`,
    /// in key order
    pub fn tag(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self::with_resolver(move |store, _injection| {
            let mut values = Vec::new();
            let mut pending = Vec::new();
            for key in store.find_keys_by_tag(&tag) {
                match store.get_value_or_promise(&key)? {
                    ValueOrPromise::Value(value) => values.push(value),
                    ValueOrPromise::Promise(promise) => {
                        let ix = values.len();
                        values.push(bound(()));
                        pending.push(async move { promise.await.map(|v| (ix, v)) }.boxed());
                    }
                }
            }
            if pending.is_empty() {
                return Ok(ValueOrPromise::Value(bound(values)));
            }
            Ok(ValueOrPromise::from_future(async move {
                for (ix, value) in try_join_all(pending).await? {
                    values[ix] = value;
                }
                Ok::<_, crate::ContextError>(bound(values))
            }))
        })
        .metadata(serde_json::json!({ "decorator": "@inject.tag" }))
    }

    /// Attach a resolver function, keeping any binding key
    pub fn resolver<F>(mut self, resolve: F) -> Self
    where
        F: Fn(&dyn ValueStore, &Injection) -> Result<ValueOrPromise<BoundValue>>
            + Send
            + Sync
            + 'static,
    {
        self.resolve = Some(Arc::new(resolve));
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// A descriptor is resolvable when it has a non-empty key or a resolver
    pub fn is_resolvable(&self) -> bool {
        self.resolve.is_some() || self.binding_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Binding that owns the object under construction, if any
    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    /// Per-call copy with the owning binding attached. The original
    /// descriptor is left untouched.
    pub fn with_binding(&self, binding: Option<&Binding>) -> Self {
        Self {
            binding: binding.cloned(),
            ..self.clone()
        }
    }
}

impl fmt::Debug for Injection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injection")
            .field("binding_key", &self.binding_key)
            .field("resolve", &self.resolve.as_ref().map(|_| "<fn>"))
            .field("metadata", &self.metadata)
            .field("binding", &self.binding.as_ref().map(Binding::key))
            .finish()
    }
}

/// Injection metadata provider
pub trait DescribeInjections {
    /// Name used in error messages
    fn name(&self) -> &str;

    /// Declared parameter count
    fn length(&self) -> usize;

    /// Parameter descriptors by position. May be shorter than
    /// [`length`](Self::length) and may contain holes.
    fn describe_injected_arguments(&self) -> &[Option<Injection>];

    /// Property descriptors by name
    fn describe_injected_properties(&self) -> &BTreeMap<String, Injection>;
}

/// Explicitly registered injection metadata for a function or class
#[derive(Debug, Clone)]
pub struct InjectionTarget {
    name: String,
    length: usize,
    arguments: Vec<Option<Injection>>,
    properties: BTreeMap<String, Injection>,
}

impl InjectionTarget {
    pub fn new(name: impl Into<String>, length: usize) -> Self {
        Self {
            name: name.into(),
            length,
            arguments: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Declare the injection for the parameter at `index`
    pub fn arg(mut self, index: usize, injection: Injection) -> Self {
        if self.arguments.len() <= index {
            self.arguments.resize(index + 1, None);
        }
        self.arguments[index] = Some(injection);
        self
    }

    /// Declare the injection for property `name`
    pub fn property(mut self, name: impl Into<String>, injection: Injection) -> Self {
        self.properties.insert(name.into(), injection);
        self
    }
}

impl DescribeInjections for InjectionTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn length(&self) -> usize {
        self.length
    }

    fn describe_injected_arguments(&self) -> &[Option<Injection>] {
        &self.arguments
    }

    fn describe_injected_properties(&self) -> &BTreeMap<String, Injection> {
        &self.properties
    }
}
