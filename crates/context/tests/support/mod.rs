//! Test Support Utilities
//!
//! Shared helpers for the resolver integration suites:
//! - Mock value store
//! - Manually completed promises backed by oneshot channels
//! - Value extraction helpers
#![allow(dead_code)]

use context::{bound, Arguments, BoundValue, ContextError, Injection, ValueOrPromise, ValueStore};
use futures::channel::oneshot;
use mockall::mock;
use std::time::Duration;

mock! {
    pub Store {}

    impl ValueStore for Store {
        fn get_value_or_promise(&self, key: &str) -> context::Result<ValueOrPromise<BoundValue>>;
    }
}

/// Promise the test completes by hand through the returned sender
pub fn manual_promise() -> (oneshot::Sender<BoundValue>, ValueOrPromise<BoundValue>) {
    let (tx, rx) = oneshot::channel::<BoundValue>();
    let promise = ValueOrPromise::from_future(async move { rx.await.map_err(anyhow::Error::from) });
    (tx, promise)
}

/// Injection whose resolver yields `value` immediately
pub fn sync_value(value: i64) -> Injection {
    Injection::with_resolver(move |_, _| Ok(ValueOrPromise::Value(bound(value))))
}

/// Injection whose resolver yields `value` after `delay`
pub fn delayed_value(value: i64, delay: Duration) -> Injection {
    Injection::with_resolver(move |_, _| {
        Ok(ValueOrPromise::from_future(async move {
            tokio::time::sleep(delay).await;
            Ok::<_, ContextError>(bound(value))
        }))
    })
}

/// Injection whose resolver yields a promise that fails with `message`
pub fn failing_promise(message: &'static str) -> Injection {
    Injection::with_resolver(move |_, _| {
        Ok(ValueOrPromise::<BoundValue>::from_future(async move {
            Err(anyhow::anyhow!(message))
        }))
    })
}

pub fn as_i64(args: &Arguments) -> Vec<i64> {
    args.iter()
        .map(|value| *value.downcast_ref::<i64>().expect("i64 argument"))
        .collect()
}

/// Route resolver logs through the test writer
pub fn init() {
    common::init_test_logging();
}
