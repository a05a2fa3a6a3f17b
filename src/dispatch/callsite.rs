use std::fmt;
use std::sync::Arc;

use dyncall_value::Value;
use log::trace;

use crate::entry_point::{with_entry_point, EntryPointKind};
use crate::error::CallResult;
use crate::intercept::CallInterceptor;
use crate::invocation::Invocation;
use crate::registry::InterceptorResolver;
use crate::scope::CallScope;

/// Outcome of the lookup half of the call-site protocol.
pub enum Dispatch<'r> {
    /// The resolver does not know the call's name.
    Direct,
    /// The name is known but nothing is registered for the exact scope.
    Fallback,
    /// An interceptor is registered for the exact scope.
    Intercept(&'r Arc<dyn CallInterceptor>),
}

impl Dispatch<'_> {
    pub fn is_intercepted(&self) -> bool {
        matches!(self, Dispatch::Intercept(_))
    }
}

impl fmt::Display for Dispatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Direct => write!(f, "direct"),
            Dispatch::Fallback => write!(f, "fallback"),
            Dispatch::Intercept(interceptor) => write!(f, "intercept by {}", interceptor.name()),
        }
    }
}

impl fmt::Debug for Dispatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A call site with a fixed scope and consumer.
pub struct CallSite<'r> {
    resolver: &'r InterceptorResolver,
    scope: CallScope,
    consumer: String,
    entry_point: bool,
}

impl<'r> CallSite<'r> {
    pub fn new(resolver: &'r InterceptorResolver, scope: CallScope, consumer: impl Into<String>) -> Self {
        Self {
            resolver,
            scope,
            consumer: consumer.into(),
            entry_point: false,
        }
    }

    /// Push an entry point for this call before handing it to an interceptor.
    pub fn with_entry_point(mut self, enabled: bool) -> Self {
        self.entry_point = enabled;
        self
    }

    pub fn scope(&self) -> &CallScope {
        &self.scope
    }

    pub fn consumer(&self) -> &str {
        &self.consumer
    }

    pub fn classify(&self) -> Dispatch<'r> {
        if !self.resolver.is_aware_of_call_site_name(self.scope.name()) {
            return Dispatch::Direct;
        }
        match self.resolver.resolve_call_interceptor(&self.scope) {
            Some(interceptor) => Dispatch::Intercept(interceptor),
            None => Dispatch::Fallback,
        }
    }

    /// Run the call, through an interceptor if one applies.
    ///
    /// `original` performs the unmodified call. Without an interceptor it
    /// runs exactly once and its result is returned as is; with one, the
    /// interceptor decides.
    pub fn dispatch<F>(&self, receiver: Value, arguments: Vec<Value>, mut original: F) -> CallResult
    where
        F: FnMut() -> CallResult,
    {
        let stats = self.resolver.stats();
        match self.classify() {
            Dispatch::Direct => original(),
            Dispatch::Fallback => {
                trace!("no interceptor for {}, falling back", self.scope);
                stats.record_fallback();
                original()
            }
            Dispatch::Intercept(interceptor) => {
                trace!("{} intercepts {} from {}", interceptor.name(), self.scope, self.consumer);
                stats.record_intercepted();
                let invocation = Invocation::new(&self.scope, receiver, arguments, &mut original);
                if self.entry_point {
                    with_entry_point(
                        &self.consumer,
                        self.scope.name(),
                        self.scope.kind().into(),
                        || interceptor.do_intercept(invocation, &self.consumer),
                    )
                } else {
                    interceptor.do_intercept(invocation, &self.consumer)
                }
            }
        }
    }
}

/// Write `value` to property `name` of `receiver`.
pub fn set_property<F>(
    resolver: &InterceptorResolver,
    receiver: Value,
    name: &str,
    value: Value,
    consumer: &str,
    original: F,
) -> CallResult
where
    F: FnMut() -> CallResult,
{
    CallSite::new(resolver, CallScope::writes_of_properties_named(name), consumer)
        .dispatch(receiver, vec![value], original)
}

/// Read property `name` of `receiver`.
pub fn get_property<F>(
    resolver: &InterceptorResolver,
    receiver: Value,
    name: &str,
    consumer: &str,
    original: F,
) -> CallResult
where
    F: FnMut() -> CallResult,
{
    CallSite::new(resolver, CallScope::reads_of_properties_named(name), consumer)
        .dispatch(receiver, Vec::new(), original)
}

/// Call method `name` on `receiver`.
///
/// The scope with the call's arity is looked up first, then the scope
/// without arity. Each lookup is an exact match.
pub fn invoke_method<F>(
    resolver: &InterceptorResolver,
    receiver: Value,
    name: &str,
    arguments: Vec<Value>,
    consumer: &str,
    original: F,
) -> CallResult
where
    F: FnMut() -> CallResult,
{
    let with_arity = CallSite::new(
        resolver,
        CallScope::method_calls_with_arity(name, arguments.len()),
        consumer,
    );
    if with_arity.classify().is_intercepted() {
        return with_arity.dispatch(receiver, arguments, original);
    }
    CallSite::new(resolver, CallScope::method_calls_named(name), consumer)
        .dispatch(receiver, arguments, original)
}

/// Write a property on an object that does its own dynamic dispatch.
///
/// No interceptor is looked up here. If the name is known, the write runs
/// inside a `SET_PROPERTY` entry point, and interceptors reached from the
/// object's own dispatch can claim `consumer` as their origin.
pub fn set_tracked_property<F>(
    resolver: &InterceptorResolver,
    name: &str,
    consumer: &str,
    original: F,
) -> CallResult
where
    F: FnOnce() -> CallResult,
{
    if !resolver.is_aware_of_call_site_name(name) {
        return original();
    }
    resolver.stats().record_tracked();
    with_entry_point(consumer, name, EntryPointKind::SetProperty, original)
}
