//! Before/after observation of intercepted calls.
//!
//! # Recording
//!
//! A recording observer returns `None` from [`CallObserver::before`] so the
//! original call runs, and records the outcome in [`CallObserver::after`].
//!
//! # Replay
//!
//! A replay observer returns `Some(value)` from `before`, short-circuiting the
//! original call. `after` is not called for short-circuited calls.

use std::sync::Arc;

use dyncall_value::Value;

use super::CallInterceptor;
use crate::error::CallResult;
use crate::invocation::Invocation;
use crate::scope::CallScope;

/// Hooks run around the original call.
pub trait CallObserver: Send + Sync {
    /// Called before the original call runs.
    ///
    /// Return `Some(value)` to skip the original call and return `value`.
    /// Return `None` to proceed normally.
    fn before(&self, _invocation: &Invocation<'_>, _consumer: &str) -> Option<Value> {
        None
    }

    /// Called after the original call returns, successfully or not.
    fn after(&self, _invocation: &Invocation<'_>, _consumer: &str, _outcome: &CallResult) {}
}

impl<O: CallObserver + ?Sized> CallObserver for Arc<O> {
    fn before(&self, invocation: &Invocation<'_>, consumer: &str) -> Option<Value> {
        (**self).before(invocation, consumer)
    }

    fn after(&self, invocation: &Invocation<'_>, consumer: &str, outcome: &CallResult) {
        (**self).after(invocation, consumer, outcome)
    }
}

/// Adapts a [`CallObserver`] into a [`CallInterceptor`].
///
/// The outcome of the original call, failure included, is returned exactly as
/// the original call produced it.
pub struct Observed<O> {
    name: String,
    scopes: Vec<CallScope>,
    observer: O,
}

impl<O: CallObserver> Observed<O> {
    pub fn new(name: impl Into<String>, scopes: impl IntoIterator<Item = CallScope>, observer: O) -> Self {
        Self {
            name: name.into(),
            scopes: scopes.into_iter().collect(),
            observer,
        }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }
}

impl<O: CallObserver> CallInterceptor for Observed<O> {
    fn name(&self) -> &str {
        &self.name
    }

    fn scopes(&self) -> Vec<CallScope> {
        self.scopes.clone()
    }

    fn do_intercept(&self, mut invocation: Invocation<'_>, consumer: &str) -> CallResult {
        if let Some(replayed) = self.observer.before(&invocation, consumer) {
            return Ok(replayed);
        }
        let outcome = invocation.call_original();
        self.observer.after(&invocation, consumer, &outcome);
        outcome
    }
}
