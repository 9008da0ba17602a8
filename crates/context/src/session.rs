//! Per-thread bookkeeping for nested class instantiation
//!
//! Class bindings re-enter the resolver through the value store, whose
//! lookup carries no resolution state. The synchronous part of a resolution
//! always runs on one thread, so the state lives in a thread-local:
//!
//! - the configuration of the innermost active resolver call, inherited by
//!   class bindings it reaches;
//! - the keys of the class bindings currently being instantiated, used to
//!   reject cycles and overly deep chains before they exhaust the stack.

use std::cell::RefCell;
use tracing::error;

use crate::config::ResolverConfig;
use crate::errors::{ContextError, Result};

#[derive(Default)]
struct Session {
    configs: Vec<ResolverConfig>,
    bindings: Vec<String>,
}

thread_local! {
    static SESSION: RefCell<Session> = RefCell::new(Session::default());
}

/// Run `f` with `config` as the configuration nested class bindings inherit
pub(crate) fn with_config<R>(config: &ResolverConfig, f: impl FnOnce() -> R) -> R {
    SESSION.with(|session| session.borrow_mut().configs.push(config.clone()));
    let _scope = ConfigScope;
    f()
}

/// Configuration of the innermost active resolver call, or the default one
pub(crate) fn current_config() -> ResolverConfig {
    SESSION.with(|session| session.borrow().configs.last().cloned().unwrap_or_default())
}

/// Mark the class binding `key` as being instantiated until the returned
/// frame is dropped
pub(crate) fn enter_binding(key: &str, max_depth: usize) -> Result<BindingFrame> {
    SESSION.with(|session| {
        let mut session = session.borrow_mut();

        if session.bindings.iter().any(|active| active == key) {
            let chain = session
                .bindings
                .iter()
                .skip_while(|active| active.as_str() != key)
                .map(String::as_str)
                .chain(std::iter::once(key))
                .collect::<Vec<_>>()
                .join(" -> ");
            error!(chain = %chain, "circular class binding");
            return Err(ContextError::CircularDependency { chain });
        }

        if session.bindings.len() >= max_depth {
            error!(key, max_depth, "class binding chain too deep");
            return Err(ContextError::MaxDepthExceeded {
                max_depth,
                key: key.to_string(),
            });
        }

        session.bindings.push(key.to_string());
        Ok(BindingFrame)
    })
}

struct ConfigScope;

impl Drop for ConfigScope {
    fn drop(&mut self) {
        SESSION.with(|session| {
            session.borrow_mut().configs.pop();
        });
    }
}

/// Active class binding; popped on drop, including during unwinding
pub(crate) struct BindingFrame;

impl Drop for BindingFrame {
    fn drop(&mut self) {
        SESSION.with(|session| {
            session.borrow_mut().bindings.pop();
        });
    }
}
