//! Error types
//!
//! [`CallError`] is the single failure type that flows through a dispatched
//! call. An original call and an interceptor fail with the same type, so the
//! caller cannot tell the two apart unless an interceptor deliberately wraps
//! the failure in [`CallError::Interceptor`].

use thiserror::Error;

use crate::scope::CallScope;

/// Failure of a dynamically dispatched call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CallError {
    #[error("no such property: {property} for {receiver}")]
    MissingProperty { receiver: String, property: String },

    #[error("cannot set read-only property: {property} for {receiver}")]
    ReadOnlyProperty { receiver: String, property: String },

    #[error("no signature of method: {receiver}.{method}() is applicable for {arity} argument(s)")]
    MissingMethod {
        receiver: String,
        method: String,
        arity: usize,
    },

    /// A failure raised by user code, identified by its kind.
    #[error("{kind}: {message}")]
    Raised { kind: String, message: String },

    /// A failure deliberately annotated by an interceptor.
    #[error("interceptor for {scope} failed: {message}")]
    Interceptor { scope: CallScope, message: String },
}

impl CallError {
    pub fn raised(kind: impl Into<String>, message: impl Into<String>) -> Self {
        CallError::Raised {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

pub type CallResult<T = dyncall_value::Value> = Result<T, CallError>;

/// Errors building or installing an interceptor registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("duplicate interceptor registration for {scope}: {existing} and {duplicate}")]
    DuplicateScope {
        scope: CallScope,
        existing: String,
        duplicate: String,
    },

    #[error("interceptor {0} is not bound to any call scope")]
    Unbound(String),

    #[error("an interceptor resolver has already been installed")]
    AlreadyInstalled,
}
