//! Class definitions - injection metadata plus how to build and fill an instance

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

use crate::binding::{downcast, Binding, BoundValue, ClassFactory};
use crate::errors::{ContextError, Result};
use crate::injection::{DescribeInjections, Injection, InjectionTarget};
use crate::resolved::{Arguments, Properties};
use crate::resolver::InjectionResolver;
use crate::session;
use crate::store::ValueStore;
use crate::value_or_promise::ValueOrPromise;

pub(crate) type Constructor<T> = Arc<dyn Fn(Arguments) -> Result<T> + Send + Sync>;
type PropertySetter<T> = Arc<dyn Fn(&mut T, BoundValue) -> Result<()> + Send + Sync>;

/// A constructible type with injected parameters and properties.
///
/// ```ignore
/// let class = Class::new("Greeter", 1, |args| {
///         Ok(Greeter { name: args.get::<String>(0)?.to_string(), greeting: String::new() })
///     })
///     .arg(0, Injection::key("user.name"))
///     .property("greeting", Injection::key("greeting"), |g: &mut Greeter, v: Arc<String>| {
///         g.greeting = v.to_string()
///     });
/// ```
pub struct Class<T> {
    target: InjectionTarget,
    constructor: Constructor<T>,
    setters: Arc<HashMap<String, PropertySetter<T>>>,
}

impl<T> Clone for Class<T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            constructor: Arc::clone(&self.constructor),
            setters: Arc::clone(&self.setters),
        }
    }
}

impl<T: Send + 'static> Class<T> {
    /// Define a class named `name` whose constructor declares `length` parameters
    pub fn new<F>(name: impl Into<String>, length: usize, constructor: F) -> Self
    where
        F: Fn(Arguments) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            target: InjectionTarget::new(name, length),
            constructor: Arc::new(constructor),
            setters: Arc::new(HashMap::new()),
        }
    }

    /// Declare the injection for constructor parameter `index`
    pub fn arg(mut self, index: usize, injection: Injection) -> Self {
        self.target = self.target.arg(index, injection);
        self
    }

    /// Declare an injected property with a typed setter
    pub fn property<V, F>(mut self, name: impl Into<String>, injection: Injection, setter: F) -> Self
    where
        V: Any + Send + Sync,
        F: Fn(&mut T, Arc<V>) + Send + Sync + 'static,
    {
        let name = name.into();
        let class_name = self.target.name().to_string();
        let slot = format!("property {name}");
        let setter: PropertySetter<T> = Arc::new(move |instance: &mut T, value: BoundValue| {
            let value = downcast::<V>(value, &class_name, slot.clone())?;
            setter(instance, value);
            Ok(())
        });

        Arc::make_mut(&mut self.setters).insert(name.clone(), setter);
        self.target = self.target.property(name, injection);
        self
    }

    /// Run the constructor with resolved arguments
    pub fn construct(&self, args: Arguments) -> Result<T> {
        trace!(class = %self.target.name(), args = args.len(), "constructing instance");
        (self.constructor)(args)
    }

    /// Write resolved properties onto `instance`, overwriting current values
    pub fn apply_properties(&self, instance: &mut T, properties: Properties) -> Result<()> {
        apply_properties(self.target.name(), &self.setters, instance, properties)
    }

    pub(crate) fn constructor(&self) -> Constructor<T> {
        Arc::clone(&self.constructor)
    }

    pub(crate) fn property_applier(&self) -> PropertyApplier<T> {
        PropertyApplier {
            class_name: self.target.name().to_string(),
            setters: Arc::clone(&self.setters),
        }
    }
}

/// Owned handle for applying properties after the class borrow has ended
pub(crate) struct PropertyApplier<T> {
    class_name: String,
    setters: Arc<HashMap<String, PropertySetter<T>>>,
}

impl<T> PropertyApplier<T> {
    pub(crate) fn apply(&self, instance: &mut T, properties: Properties) -> Result<()> {
        apply_properties(&self.class_name, &self.setters, instance, properties)
    }
}

fn apply_properties<T>(
    class_name: &str,
    setters: &HashMap<String, PropertySetter<T>>,
    instance: &mut T,
    properties: Properties,
) -> Result<()> {
    for (name, value) in properties {
        let setter = setters
            .get(&name)
            .ok_or_else(|| ContextError::UnknownProperty {
                target: class_name.to_string(),
                property: name.clone(),
            })?;
        setter(instance, value)?;
    }
    Ok(())
}

impl<T> DescribeInjections for Class<T> {
    fn name(&self) -> &str {
        self.target.name()
    }

    fn length(&self) -> usize {
        self.target.length()
    }

    fn describe_injected_arguments(&self) -> &[Option<Injection>] {
        self.target.describe_injected_arguments()
    }

    fn describe_injected_properties(&self) -> &BTreeMap<String, Injection> {
        self.target.describe_injected_properties()
    }
}

impl<T: Any + Send + Sync> ClassFactory for Class<T> {
    fn class_name(&self) -> &str {
        self.target.name()
    }

    fn instantiate_bound(
        &self,
        store: &dyn ValueStore,
        binding: &Binding,
    ) -> Result<ValueOrPromise<BoundValue>> {
        let config = session::current_config();
        let _frame = session::enter_binding(binding.key(), config.max_resolution_depth)?;
        let instance = InjectionResolver::new(config).instantiate(self, store, Some(binding))?;
        Ok(instance.map(|instance| Arc::new(instance) as BoundValue))
    }
}

impl<T> fmt::Debug for Class<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("target", &self.target)
            .field("setters", &self.setters.keys().collect::<Vec<_>>())
            .finish()
    }
}
