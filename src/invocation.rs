//! Invocations
//!
//! An [`Invocation`] is a call that has been captured but not yet executed.
//! The call site builds one, hands it to the matched interceptor, and the
//! interceptor alone decides whether and when the original call runs.

use std::fmt;

use dyncall_value::Value;

use crate::error::CallResult;
use crate::scope::CallScope;

/// A reified pending call.
///
/// The receiver and arguments are read-only: interceptors observe them but
/// cannot change what the original call sees. The original call is borrowed
/// from the call site, so building an invocation never allocates a closure.
pub struct Invocation<'a> {
    scope: &'a CallScope,
    receiver: Value,
    arguments: Vec<Value>,
    original: &'a mut dyn FnMut() -> CallResult,
    original_calls: usize,
}

impl<'a> Invocation<'a> {
    pub fn new(
        scope: &'a CallScope,
        receiver: Value,
        arguments: Vec<Value>,
        original: &'a mut dyn FnMut() -> CallResult,
    ) -> Self {
        Self {
            scope,
            receiver,
            arguments,
            original,
            original_calls: 0,
        }
    }

    /// The scope this invocation was resolved under.
    pub fn scope(&self) -> &CallScope {
        self.scope
    }

    pub fn receiver(&self) -> &Value {
        &self.receiver
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn argument(&self, index: usize) -> Option<&Value> {
        self.arguments.get(index)
    }

    /// Run the unmodified call.
    ///
    /// Whatever the original call returns, success or failure, is handed back
    /// untouched.
    pub fn call_original(&mut self) -> CallResult {
        self.original_calls += 1;
        (self.original)()
    }

    /// How many times the original call has run through this invocation.
    pub fn original_calls(&self) -> usize {
        self.original_calls
    }
}

impl fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("scope", &self.scope)
            .field("receiver", &self.receiver)
            .field("arguments", &self.arguments)
            .field("original_calls", &self.original_calls)
            .finish_non_exhaustive()
    }
}
