//! Entry-point wrapper for interceptors.

use super::CallInterceptor;
use crate::entry_point::with_entry_point;
use crate::error::CallResult;
use crate::invocation::Invocation;
use crate::scope::CallScope;

/// Runs the wrapped interceptor inside an entry point for the invocation's
/// scope, so calls it triggers can be attributed back to `consumer`.
pub struct Tracked<I> {
    inner: I,
}

impl<I: CallInterceptor> Tracked<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }
}

impl<I: CallInterceptor> CallInterceptor for Tracked<I> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn scopes(&self) -> Vec<CallScope> {
        self.inner.scopes()
    }

    fn do_intercept(&self, invocation: Invocation<'_>, consumer: &str) -> CallResult {
        let name = invocation.scope().name().to_string();
        let kind = invocation.scope().kind().into();
        with_entry_point(consumer, &name, kind, || self.inner.do_intercept(invocation, consumer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry_point::{self, EntryPointKind};
    use crate::intercept::from_fn;
    use dyncall_value::Value;

    #[test]
    fn inner_runs_inside_frame_and_frame_is_popped() {
        let scope = CallScope::writes_of_properties_named("version");
        let tracked = Tracked::new(from_fn("version-check", [scope.clone()], |mut invocation, _consumer| {
            let current = entry_point::current_entry_point().unwrap();
            assert_eq!(current.kind, EntryPointKind::SetProperty);
            assert_eq!(current.name, "version");
            assert_eq!(current.consumer, "build.gradle");
            invocation.call_original()
        }));

        let mut original = || -> CallResult { Ok(Value::Null) };
        let invocation = Invocation::new(&scope, Value::Null, vec![Value::from("1.0")], &mut original);
        tracked.do_intercept(invocation, "build.gradle").unwrap();
        assert_eq!(entry_point::depth(), 0);
        assert_eq!(tracked.name(), "version-check");
        assert_eq!(tracked.inner().scopes(), tracked.scopes());
    }
}
