//! Dispatch counters
//!
//! Every resolver keeps a set of counters describing which way its call sites
//! went once the name check passed. Calls whose name the resolver does not
//! know are not counted. The counters are plain relaxed atomics: the counts
//! are instrumentation, not synchronization.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct DispatchStats {
    fallback: AtomicU64,
    intercepted: AtomicU64,
    tracked: AtomicU64,
}

/// Point-in-time copy of [`DispatchStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchCounts {
    /// Calls with a known name but no interceptor for the exact scope.
    pub fallback: u64,
    /// Calls handed to an interceptor as an invocation.
    pub intercepted: u64,
    /// Instrumented dynamic calls run inside an entry point without lookup.
    pub tracked: u64,
}

impl DispatchStats {
    pub(crate) fn record_fallback(&self) {
        self.fallback.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_intercepted(&self) {
        self.intercepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_tracked(&self) {
        self.tracked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DispatchCounts {
        DispatchCounts {
            fallback: self.fallback.load(Ordering::Relaxed),
            intercepted: self.intercepted.load(Ordering::Relaxed),
            tracked: self.tracked.load(Ordering::Relaxed),
        }
    }
}
