//! Recording and replaying interceptors.

use std::sync::Arc;

use dyncall_value::Value;
use log::debug;
use parking_lot::Mutex;

use super::{CallObserver, Observed};
use crate::entry_point::{self, EntryPoint};
use crate::error::CallResult;
use crate::invocation::Invocation;
use crate::scope::CallScope;

/// One intercepted call, as seen by a [`CallLog`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub consumer: String,
    pub scope: CallScope,
    pub receiver: Value,
    pub arguments: Vec<Value>,
    pub outcome: CallResult,
    /// Innermost entry point in flight when the call completed.
    pub entry_point: Option<EntryPoint>,
}

/// Thread-safe log of intercepted calls.
#[derive(Debug, Default)]
pub struct CallLog {
    calls: Mutex<Vec<RecordedCall>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every call recorded so far, in completion order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    /// Number of recorded calls made under `scope`.
    pub fn count_for(&self, scope: &CallScope) -> usize {
        self.calls.lock().iter().filter(|call| &call.scope == scope).count()
    }

    /// Remove and return every recorded call.
    pub fn drain(&self) -> Vec<RecordedCall> {
        std::mem::take(&mut *self.calls.lock())
    }
}

impl CallObserver for CallLog {
    fn after(&self, invocation: &Invocation<'_>, consumer: &str, outcome: &CallResult) {
        debug!("recorded {} from {}", invocation.scope(), consumer);
        self.calls.lock().push(RecordedCall {
            consumer: consumer.to_string(),
            scope: invocation.scope().clone(),
            receiver: invocation.receiver().clone(),
            arguments: invocation.arguments().to_vec(),
            outcome: outcome.clone(),
            entry_point: entry_point::current_entry_point(),
        });
    }
}

pub type RecordingInterceptor = Observed<Arc<CallLog>>;

/// Interceptor that runs every call and records it into `log`.
pub fn recording(scopes: impl IntoIterator<Item = CallScope>, log: Arc<CallLog>) -> RecordingInterceptor {
    Observed::new("recording", scopes, log)
}

/// Replays a fixed value instead of running the original call.
#[derive(Debug, Clone)]
pub struct Substitute {
    value: Value,
}

impl Substitute {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl CallObserver for Substitute {
    fn before(&self, invocation: &Invocation<'_>, consumer: &str) -> Option<Value> {
        debug!("substituting {} from {}", invocation.scope(), consumer);
        Some(self.value.clone())
    }
}

pub type SubstituteInterceptor = Observed<Substitute>;

/// Interceptor that never runs the original call and returns `value`.
pub fn substitute(scopes: impl IntoIterator<Item = CallScope>, value: impl Into<Value>) -> SubstituteInterceptor {
    Observed::new("substitute", scopes, Substitute::new(value))
}
