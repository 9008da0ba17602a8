//! ValueOrPromise - a value that is either available now or realized later
//!
//! Resolution never forces immediate values through the async machinery:
//! callers branch on [`ValueOrPromise::is_promise`] and only pay for a future
//! when some dependency actually produced one.

use futures::future::{self, BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;

use crate::errors::{ContextError, Result};

/// Either a realized `T` or a boxed future that realizes to `T` at most once
pub enum ValueOrPromise<T> {
    /// Already available
    Value(T),
    /// Realized asynchronously; failures travel through the future's output
    Promise(BoxFuture<'static, Result<T>>),
}

/// Free-standing classification helper, mirrors [`ValueOrPromise::is_promise`]
pub fn is_promise<T>(value: &ValueOrPromise<T>) -> bool {
    value.is_promise()
}

impl<T> ValueOrPromise<T> {
    /// True when the value has to be awaited
    pub fn is_promise(&self) -> bool {
        matches!(self, ValueOrPromise::Promise(_))
    }

    /// True when the value is available without awaiting
    pub fn is_value(&self) -> bool {
        !self.is_promise()
    }

    /// Take the immediate value, handing the promise back untouched otherwise
    pub fn try_into_value(self) -> std::result::Result<T, Self> {
        match self {
            ValueOrPromise::Value(value) => Ok(value),
            promise => Err(promise),
        }
    }
}

impl<T: Send + 'static> ValueOrPromise<T> {
    /// Wrap any future as a promise.
    ///
    /// Accepts futures from any async source as long as their error converts
    /// into [`ContextError`] (`anyhow::Error` does), so tokio timers, channels
    /// and plain `async` blocks are all classified the same way.
    pub fn from_future<F, E>(future: F) -> Self
    where
        F: Future<Output = std::result::Result<T, E>> + Send + 'static,
        E: Into<ContextError>,
    {
        ValueOrPromise::Promise(future.map(|result| result.map_err(Into::into)).boxed())
    }

    /// Convert into a future, wrapping immediate values in a ready future
    pub fn into_future(self) -> BoxFuture<'static, Result<T>> {
        match self {
            ValueOrPromise::Value(value) => future::ready(Ok(value)).boxed(),
            ValueOrPromise::Promise(promise) => promise,
        }
    }

    /// Realize the value regardless of its shape
    pub async fn resolve(self) -> Result<T> {
        match self {
            ValueOrPromise::Value(value) => Ok(value),
            ValueOrPromise::Promise(promise) => promise.await,
        }
    }

    /// Transform the value, staying synchronous when possible
    pub fn map<U, F>(self, f: F) -> ValueOrPromise<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        match self {
            ValueOrPromise::Value(value) => ValueOrPromise::Value(f(value)),
            ValueOrPromise::Promise(promise) => {
                ValueOrPromise::Promise(promise.map(|result| result.map(f)).boxed())
            }
        }
    }

    /// Chain a step that may itself be asynchronous.
    ///
    /// The result is flattened: a promise whose continuation returns another
    /// promise becomes a single promise. Errors from `f` on an immediate value
    /// are returned synchronously.
    pub fn and_then<U, F>(self, f: F) -> Result<ValueOrPromise<U>>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<ValueOrPromise<U>> + Send + 'static,
    {
        match self {
            ValueOrPromise::Value(value) => f(value),
            ValueOrPromise::Promise(promise) => Ok(ValueOrPromise::Promise(
                async move {
                    let value = promise.await?;
                    f(value)?.resolve().await
                }
                .boxed(),
            )),
        }
    }
}

impl<T: Send + 'static> ValueOrPromise<ValueOrPromise<T>> {
    /// Collapse nested shapes into one
    pub fn flatten(self) -> ValueOrPromise<T> {
        match self {
            ValueOrPromise::Value(inner) => inner,
            ValueOrPromise::Promise(outer) => ValueOrPromise::Promise(
                async move { outer.await?.resolve().await }.boxed(),
            ),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueOrPromise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueOrPromise::Value(value) => f.debug_tuple("Value").field(value).finish(),
            ValueOrPromise::Promise(_) => f.write_str("Promise(<pending>)"),
        }
    }
}
