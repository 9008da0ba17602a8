//! Bindings - a key plus the recipe that produces its value

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::errors::{ContextError, Result};
use crate::store::ValueStore;
use crate::value_or_promise::ValueOrPromise;

/// Type-erased value produced by a binding
pub type BoundValue = Arc<dyn Any + Send + Sync>;

/// Box a concrete value into a [`BoundValue`]
pub fn bound<T: Any + Send + Sync>(value: T) -> BoundValue {
    Arc::new(value)
}

/// Checked downcast with an error naming who asked for what
pub fn downcast<T: Any + Send + Sync>(
    value: BoundValue,
    target: &str,
    slot: impl Into<String>,
) -> Result<Arc<T>> {
    value.downcast::<T>().map_err(|_| ContextError::TypeMismatch {
        target: target.to_string(),
        slot: slot.into(),
        expected: std::any::type_name::<T>(),
    })
}

type DynamicFactory = Arc<dyn Fn() -> Result<ValueOrPromise<BoundValue>> + Send + Sync>;

/// Type-erased class instantiation, implemented by [`crate::Class`]
pub(crate) trait ClassFactory: Send + Sync {
    fn class_name(&self) -> &str;

    fn instantiate_bound(
        &self,
        store: &dyn ValueStore,
        binding: &Binding,
    ) -> Result<ValueOrPromise<BoundValue>>;
}

#[derive(Clone)]
enum BindingSource {
    Unset,
    Constant(BoundValue),
    Dynamic(DynamicFactory),
    Class(Arc<dyn ClassFactory>),
}

/// A key associated with a way to produce its value.
///
/// Bindings do not cache: dynamic and class sources run on every lookup.
#[derive(Clone)]
pub struct Binding {
    key: String,
    tags: BTreeSet<String>,
    source: BindingSource,
}

impl Binding {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            tags: BTreeSet::new(),
            source: BindingSource::Unset,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Bind a constant value
    pub fn to<T: Any + Send + Sync>(self, value: T) -> Self {
        self.to_bound(bound(value))
    }

    /// Bind an already type-erased value
    pub fn to_bound(mut self, value: BoundValue) -> Self {
        self.source = BindingSource::Constant(value);
        self
    }

    /// Bind a closure evaluated synchronously on every lookup
    pub fn to_dynamic_value<T, F>(mut self, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.source = BindingSource::Dynamic(Arc::new(move || {
            Ok(ValueOrPromise::Value(bound(factory())))
        }));
        self
    }

    /// Bind a closure whose future is awaited on every lookup
    pub fn to_async_value<T, F, Fut>(mut self, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        self.source = BindingSource::Dynamic(Arc::new(move || {
            let future = factory();
            Ok(ValueOrPromise::from_future(async move {
                future.await.map(|value| bound(value))
            }))
        }));
        self
    }

    /// Bind a class instantiated through the resolver on every lookup.
    ///
    /// The binding is passed along as the owning binding of the instantiation.
    /// The class is instantiated with the configuration of the resolver call
    /// that reached the binding, or the default one for direct store lookups.
    /// A class that needs itself, directly or through other class bindings,
    /// fails with `CircularDependency`.
    pub fn to_class<T>(mut self, class: crate::Class<T>) -> Self
    where
        T: Any + Send + Sync,
    {
        self.source = BindingSource::Class(Arc::new(class));
        self
    }

    /// Produce the bound value, immediately or as a promise
    pub fn get_value(&self, store: &dyn ValueStore) -> Result<ValueOrPromise<BoundValue>> {
        match &self.source {
            BindingSource::Unset => Err(ContextError::KeyNotBound {
                key: self.key.clone(),
            }),
            BindingSource::Constant(value) => Ok(ValueOrPromise::Value(Arc::clone(value))),
            BindingSource::Dynamic(factory) => factory(),
            BindingSource::Class(class) => class.instantiate_bound(store, self),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            BindingSource::Unset => "unset".to_string(),
            BindingSource::Constant(_) => "constant".to_string(),
            BindingSource::Dynamic(_) => "dynamic".to_string(),
            BindingSource::Class(class) => format!("class {}", class.class_name()),
        };
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("tags", &self.tags)
            .field("source", &source)
            .finish()
    }
}
