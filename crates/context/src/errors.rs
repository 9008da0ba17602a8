//! Error types for injection resolution.
//!
//! Two families of failures flow through the engine:
//!
//! - **Declaration errors** (`MissingArgumentInjection`, `MissingPropertyInjection`):
//!   a parameter or property has no binding key and no resolver function.
//!   These are raised synchronously, never through a promise, and are not retried.
//! - **Store errors** (`KeyNotBound`, `Other`, ...): produced by the value store or
//!   by custom resolver functions. The engine passes them through untouched,
//!   either as the synchronous `Err` or as the promise's failure.

use thiserror::Error;

/// Main error type for every resolution operation
#[derive(Debug, Error)]
pub enum ContextError {
    /// A declared parameter has no usable injection descriptor
    #[error(
        "Cannot resolve injected arguments for function {target}: \
         The argument {} was not decorated for dependency injection.",
        .index + 1
    )]
    MissingArgumentInjection { target: String, index: usize },

    /// An injected property has neither a binding key nor a resolver function
    #[error(
        "Cannot resolve injected property for class {target}: \
         The property {property} was not decorated for dependency injection."
    )]
    MissingPropertyInjection { target: String, property: String },

    /// The store has no binding for the requested key
    #[error("The key '{key}' is not bound to any value")]
    KeyNotBound { key: String },

    /// A synchronous lookup hit a binding that only produces promises
    #[error("Cannot get {key} synchronously: the value is a promise")]
    SyncGetOnPromise { key: String },

    /// A resolved value could not be downcast to the type the consumer expects
    #[error("Type mismatch for {target} ({slot}): expected {expected}")]
    TypeMismatch {
        target: String,
        slot: String,
        expected: &'static str,
    },

    /// A resolved property has no setter on the class
    #[error("Class {target} has no injectable property '{property}'")]
    UnknownProperty { target: String, property: String },

    /// A class binding was reached again while it was being instantiated
    #[error("Circular dependency detected: {chain}")]
    CircularDependency { chain: String },

    /// Class bindings nested deeper than the configured limit
    #[error("Maximum resolution depth {max_depth} exceeded at binding '{key}'")]
    MaxDepthExceeded { max_depth: usize, key: String },

    /// The constructor closure rejected its arguments
    #[error("Failed to construct {target}: {message}")]
    Construction { target: String, message: String },

    /// Failures from custom resolver functions and asynchronous sources
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ContextError {
    /// True for errors caused by a malformed injection declaration
    pub fn is_missing_metadata(&self) -> bool {
        matches!(
            self,
            ContextError::MissingArgumentInjection { .. }
                | ContextError::MissingPropertyInjection { .. }
        )
    }

    /// Helper for constructor closures
    pub fn construction(target: impl Into<String>, message: impl Into<String>) -> Self {
        ContextError::Construction {
            target: target.into(),
            message: message.into(),
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, ContextError>;
