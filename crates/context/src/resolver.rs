//! Injection Resolver - turns declared injections into values
//!
//! Every operation returns synchronously when all dependencies are
//! available right away, and a single promise otherwise:
//!
//! ```text
//!               instantiate
//!          ┌─────────┴─────────┐
//!   resolve_arguments   resolve_properties
//!          │                   │
//!   Value → construct now      │
//!   Promise → construct later  │
//!          └────── apply ──────┘
//!     both Value → Value(instance)
//!     otherwise  → Promise(instance), joined with try_join
//! ```
//!
//! Deferred slots are joined with an all-of join; each one writes into its
//! own position, so completion order never affects the argument order.

use futures::future::{try_join_all, BoxFuture, FutureExt};
use tracing::{debug, error, trace};

use crate::binding::{Binding, BoundValue};
use crate::class::Class;
use crate::config::{ResolverConfig, ScanMode};
use crate::errors::{ContextError, Result};
use crate::injection::{DescribeInjections, Injection};
use crate::resolved::{Arguments, Properties};
use crate::session;
use crate::store::ValueStore;
use crate::value_or_promise::ValueOrPromise;

/// Resolve one injection: the custom resolver if present, else a store lookup
pub fn resolve(store: &dyn ValueStore, injection: &Injection) -> Result<ValueOrPromise<BoundValue>> {
    if let Some(resolve) = &injection.resolve {
        return resolve(store, injection);
    }
    match injection.binding_key.as_deref() {
        Some(key) => store.get_value_or_promise(key),
        // Callers validate descriptors before resolving
        None => Err(ContextError::KeyNotBound { key: String::new() }),
    }
}

/// Resolve constructor/function arguments with the default configuration
pub fn resolve_injected_arguments<D>(
    target: &D,
    store: &dyn ValueStore,
    binding: Option<&Binding>,
) -> Result<ValueOrPromise<Arguments>>
where
    D: DescribeInjections + ?Sized,
{
    InjectionResolver::default().resolve_arguments(target, store, binding)
}

/// Resolve injected properties with the default configuration
pub fn resolve_injected_properties<D>(
    target: &D,
    store: &dyn ValueStore,
    binding: Option<&Binding>,
) -> Result<ValueOrPromise<Properties>>
where
    D: DescribeInjections + ?Sized,
{
    InjectionResolver::default().resolve_properties(target, store, binding)
}

/// Create an instance of `class` with the default configuration
pub fn instantiate_class<T: Send + 'static>(
    class: &Class<T>,
    store: &dyn ValueStore,
    binding: Option<&Binding>,
) -> Result<ValueOrPromise<T>> {
    InjectionResolver::default().instantiate(class, store, binding)
}

/// Configured resolution engine. Holds no state besides its configuration.
#[derive(Debug, Clone, Default)]
pub struct InjectionResolver {
    config: ResolverConfig,
}

impl InjectionResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve a single injection
    pub fn resolve(
        &self,
        store: &dyn ValueStore,
        injection: &Injection,
    ) -> Result<ValueOrPromise<BoundValue>> {
        resolve(store, injection)
    }

    /// Check that every declared parameter has a usable descriptor
    pub fn validate_arguments<D>(&self, target: &D) -> Result<()>
    where
        D: DescribeInjections + ?Sized,
    {
        for index in 0..target.length() {
            argument_injection(target, index)?;
        }
        Ok(())
    }

    /// Check that every declared property has a usable descriptor
    pub fn validate_properties<D>(&self, target: &D) -> Result<()>
    where
        D: DescribeInjections + ?Sized,
    {
        for (name, injection) in target.describe_injected_properties() {
            property_injection(target, name, injection)?;
        }
        Ok(())
    }

    /// Resolve every declared parameter into a positional list.
    ///
    /// Returns `Value` when all slots resolved immediately, otherwise one
    /// promise that realizes once every deferred slot has.
    pub fn resolve_arguments<D>(
        &self,
        target: &D,
        store: &dyn ValueStore,
        binding: Option<&Binding>,
    ) -> Result<ValueOrPromise<Arguments>>
    where
        D: DescribeInjections + ?Sized,
    {
        session::with_config(&self.config, || {
            if self.config.scan_mode == ScanMode::Atomic {
                self.validate_arguments(target).inspect_err(log_missing)?;
            }
            self.scan_arguments(target, store, binding)
        })
    }

    /// Resolve every declared property into a name/value map
    pub fn resolve_properties<D>(
        &self,
        target: &D,
        store: &dyn ValueStore,
        binding: Option<&Binding>,
    ) -> Result<ValueOrPromise<Properties>>
    where
        D: DescribeInjections + ?Sized,
    {
        session::with_config(&self.config, || {
            if self.config.scan_mode == ScanMode::Atomic {
                self.validate_properties(target).inspect_err(log_missing)?;
            }
            self.scan_properties(target, store, binding)
        })
    }

    /// Create an instance of `class`.
    ///
    /// Construction waits only for the arguments; property injection waits
    /// for both the instance and the properties. The result is `Value` only
    /// when neither side was deferred.
    ///
    /// Class bindings reached while scanning are instantiated with this
    /// resolver's configuration.
    pub fn instantiate<T: Send + 'static>(
        &self,
        class: &Class<T>,
        store: &dyn ValueStore,
        binding: Option<&Binding>,
    ) -> Result<ValueOrPromise<T>> {
        session::with_config(&self.config, || self.instantiate_in_session(class, store, binding))
    }

    // === PRIVATE IMPLEMENTATION METHODS ===

    fn instantiate_in_session<T: Send + 'static>(
        &self,
        class: &Class<T>,
        store: &dyn ValueStore,
        binding: Option<&Binding>,
    ) -> Result<ValueOrPromise<T>> {
        let name = class.name().to_string();
        debug!(class = %name, binding = ?binding.map(Binding::key), "instantiating class");

        if self.config.scan_mode == ScanMode::Atomic {
            self.validate_arguments(class).inspect_err(log_missing)?;
            self.validate_properties(class).inspect_err(log_missing)?;
        }

        let args = self.scan_arguments(class, store, binding)?;
        let properties = self.scan_properties(class, store, binding)?;

        let instance = match args {
            ValueOrPromise::Value(args) => ValueOrPromise::Value(class.construct(args)?),
            ValueOrPromise::Promise(args) => {
                let constructor = class.constructor();
                ValueOrPromise::Promise(async move { constructor(args.await?) }.boxed())
            }
        };

        let applier = class.property_applier();
        match (instance, properties) {
            (ValueOrPromise::Value(mut instance), ValueOrPromise::Value(properties)) => {
                applier.apply(&mut instance, properties)?;
                trace!(class = %name, "instance ready");
                Ok(ValueOrPromise::Value(instance))
            }
            (instance, properties) => {
                debug!(
                    class = %name,
                    deferred_construction = instance.is_promise(),
                    deferred_properties = properties.is_promise(),
                    "instantiation deferred"
                );
                Ok(ValueOrPromise::Promise(
                    async move {
                        let (mut instance, properties) =
                            futures::try_join!(instance.into_future(), properties.into_future())?;
                        applier.apply(&mut instance, properties)?;
                        trace!(class = %name, "deferred instance ready");
                        Ok(instance)
                    }
                    .boxed(),
                ))
            }
        }
    }

    fn scan_arguments<D>(
        &self,
        target: &D,
        store: &dyn ValueStore,
        binding: Option<&Binding>,
    ) -> Result<ValueOrPromise<Arguments>>
    where
        D: DescribeInjections + ?Sized,
    {
        let name = target.name().to_string();
        let length = target.length();
        let mut slots: Vec<Option<BoundValue>> = vec![None; length];
        let mut pending: Vec<BoxFuture<'static, Result<(usize, BoundValue)>>> = Vec::new();

        for index in 0..length {
            let injection = argument_injection(target, index).inspect_err(log_missing)?;
            let injection = injection.with_binding(binding);

            match self.resolve(store, &injection)? {
                ValueOrPromise::Value(value) => {
                    if self.config.verbose_logging {
                        trace!(target_name = %name, index, "argument resolved synchronously");
                    }
                    slots[index] = Some(value);
                }
                ValueOrPromise::Promise(promise) => {
                    if self.config.verbose_logging {
                        trace!(target_name = %name, index, "argument deferred");
                    }
                    pending.push(promise.map(move |r| r.map(|value| (index, value))).boxed());
                }
            }
        }

        if pending.is_empty() {
            return Ok(ValueOrPromise::Value(Arguments::from_slots(name, slots)?));
        }

        debug!(target_name = %name, deferred = pending.len(), "joining deferred arguments");
        Ok(ValueOrPromise::Promise(
            async move {
                for (index, value) in try_join_all(pending).await? {
                    slots[index] = Some(value);
                }
                Arguments::from_slots(name, slots)
            }
            .boxed(),
        ))
    }

    fn scan_properties<D>(
        &self,
        target: &D,
        store: &dyn ValueStore,
        binding: Option<&Binding>,
    ) -> Result<ValueOrPromise<Properties>>
    where
        D: DescribeInjections + ?Sized,
    {
        let mut properties = Properties::new(target.name());
        let mut pending: Vec<BoxFuture<'static, Result<(String, BoundValue)>>> = Vec::new();

        for (property, injection) in target.describe_injected_properties() {
            property_injection(target, property, injection).inspect_err(log_missing)?;
            let injection = injection.with_binding(binding);

            match self.resolve(store, &injection)? {
                ValueOrPromise::Value(value) => {
                    if self.config.verbose_logging {
                        trace!(target_name = %target.name(), %property, "property resolved synchronously");
                    }
                    properties.insert(property.clone(), value);
                }
                ValueOrPromise::Promise(promise) => {
                    if self.config.verbose_logging {
                        trace!(target_name = %target.name(), %property, "property deferred");
                    }
                    let property = property.clone();
                    pending.push(promise.map(move |r| r.map(|value| (property, value))).boxed());
                }
            }
        }

        if pending.is_empty() {
            return Ok(ValueOrPromise::Value(properties));
        }

        debug!(target_name = %target.name(), deferred = pending.len(), "joining deferred properties");
        Ok(ValueOrPromise::Promise(
            async move {
                for (property, value) in try_join_all(pending).await? {
                    properties.insert(property, value);
                }
                Ok(properties)
            }
            .boxed(),
        ))
    }
}

/// Descriptor for parameter `index`, or the missing-metadata error
fn argument_injection<D>(target: &D, index: usize) -> Result<&Injection>
where
    D: DescribeInjections + ?Sized,
{
    target
        .describe_injected_arguments()
        .get(index)
        .and_then(Option::as_ref)
        .filter(|injection| injection.is_resolvable())
        .ok_or_else(|| ContextError::MissingArgumentInjection {
            target: target.name().to_string(),
            index,
        })
}

fn property_injection<D>(target: &D, property: &str, injection: &Injection) -> Result<()>
where
    D: DescribeInjections + ?Sized,
{
    if injection.is_resolvable() {
        Ok(())
    } else {
        Err(ContextError::MissingPropertyInjection {
            target: target.name().to_string(),
            property: property.to_string(),
        })
    }
}

fn log_missing(err: &ContextError) {
    error!("{}", err);
}
