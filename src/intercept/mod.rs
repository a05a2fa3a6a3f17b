//! Call Interceptor
//!
//! A [`CallInterceptor`] is handed every call whose scope it is registered
//! for, already captured as an [`Invocation`]. It can:
//!
//! - run the original call and return its result ([`Passthrough`]),
//! - run it and record or otherwise observe it ([`recording`]),
//! - skip it and return something else ([`substitute`]).
//!
//! Interceptors are shared across threads and called concurrently. Any state
//! they keep must be safe to accumulate from several threads at once; state
//! that belongs to a single call lives in the invocation.

mod observer;
mod recorder;
mod tracked;

pub use observer::{CallObserver, Observed};
pub use recorder::{
    recording, substitute, CallLog, RecordedCall, RecordingInterceptor, Substitute,
    SubstituteInterceptor,
};
pub use tracked::Tracked;

use std::sync::Arc;

use crate::error::CallResult;
use crate::invocation::Invocation;
use crate::scope::CallScope;

/// Handler for calls matching one or more [`CallScope`]s.
///
/// Failures returned by [`Invocation::call_original`] must be passed back
/// unchanged. An interceptor that wraps them instead has to say so in its
/// documentation.
pub trait CallInterceptor: Send + Sync {
    /// Stable name used in logs and registry diagnostics.
    fn name(&self) -> &str {
        "interceptor"
    }

    /// The scopes this interceptor is bound to.
    fn scopes(&self) -> Vec<CallScope>;

    /// Handle one call made from `consumer`.
    fn do_intercept(&self, invocation: Invocation<'_>, consumer: &str) -> CallResult;
}

impl<I: CallInterceptor + ?Sized> CallInterceptor for Arc<I> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn scopes(&self) -> Vec<CallScope> {
        (**self).scopes()
    }

    fn do_intercept(&self, invocation: Invocation<'_>, consumer: &str) -> CallResult {
        (**self).do_intercept(invocation, consumer)
    }
}

/// Runs the original call unchanged.
///
/// Registering a passthrough makes a name visible to the resolver without
/// changing behavior, which is useful to open entry points via [`Tracked`].
#[derive(Debug, Clone)]
pub struct Passthrough {
    scopes: Vec<CallScope>,
}

impl Passthrough {
    pub fn new(scopes: impl IntoIterator<Item = CallScope>) -> Self {
        Self {
            scopes: scopes.into_iter().collect(),
        }
    }
}

impl CallInterceptor for Passthrough {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn scopes(&self) -> Vec<CallScope> {
        self.scopes.clone()
    }

    fn do_intercept(&self, mut invocation: Invocation<'_>, _consumer: &str) -> CallResult {
        invocation.call_original()
    }
}

/// Interceptor backed by a closure.
pub struct FnInterceptor<F> {
    name: String,
    scopes: Vec<CallScope>,
    func: F,
}

/// Build an interceptor from a closure.
///
/// ```ignore
/// let logger = from_fn("log-writes", [CallScope::writes_of_properties_named("version")],
///     |mut invocation, consumer| {
///         log::info!("{} writes {:?}", consumer, invocation.arguments());
///         invocation.call_original()
///     });
/// ```
pub fn from_fn<F>(
    name: impl Into<String>,
    scopes: impl IntoIterator<Item = CallScope>,
    func: F,
) -> FnInterceptor<F>
where
    F: Fn(Invocation<'_>, &str) -> CallResult + Send + Sync,
{
    FnInterceptor {
        name: name.into(),
        scopes: scopes.into_iter().collect(),
        func,
    }
}

impl<F> CallInterceptor for FnInterceptor<F>
where
    F: Fn(Invocation<'_>, &str) -> CallResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn scopes(&self) -> Vec<CallScope> {
        self.scopes.clone()
    }

    fn do_intercept(&self, invocation: Invocation<'_>, consumer: &str) -> CallResult {
        (self.func)(invocation, consumer)
    }
}
