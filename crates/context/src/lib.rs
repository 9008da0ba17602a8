//! Context - dependency injection resolution
//!
//! Given a function or class whose parameters and properties declare
//! [`Injection`]s, resolve each one against a [`ValueStore`] and produce the
//! argument list, the property map, or a fully constructed instance.
//!
//! Results are [`ValueOrPromise`]: fully synchronous configurations never pay
//! for a future, and any asynchronous dependency turns the whole result into
//! one promise.
//!
//! ```ignore
//! let ctx = Context::new("app");
//! ctx.bind(Binding::new("greeting").to_async_value(|| async { Ok("Hi!".to_string()) }));
//!
//! let class = Class::new("Greeter", 0, |_| Ok(Greeter::default()))
//!     .property("greeting", Injection::key("greeting"), |g: &mut Greeter, v: Arc<String>| {
//!         g.greeting = v.to_string()
//!     });
//!
//! let greeter = instantiate_class(&class, &ctx, None)?.resolve().await?;
//! ```

pub mod binding;
pub mod class;
pub mod config;
pub mod errors;
pub mod injection;
pub mod resolved;
pub mod resolver;
mod session;
pub mod store;
pub mod value_or_promise;

pub use binding::{bound, downcast, Binding, BoundValue};
pub use class::Class;
pub use config::{ResolverConfig, ScanMode};
pub use errors::{ContextError, Result};
pub use injection::{DescribeInjections, Injection, InjectionTarget, ResolverFn};
pub use resolved::{Arguments, Properties};
pub use resolver::{
    instantiate_class, resolve, resolve_injected_arguments, resolve_injected_properties,
    InjectionResolver,
};
pub use store::{Context, ValueStore};
pub use value_or_promise::{is_promise, ValueOrPromise};
