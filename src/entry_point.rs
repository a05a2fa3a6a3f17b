//! Entry-point tracking
//!
//! Every thread keeps its own stack of intercepted calls that are currently
//! in flight. A frame is pushed when a call crosses a distinguishable
//! boundary (a property write on a dynamic object, say) and popped when that
//! call returns, fails or unwinds. Interceptors reached from *inside* such a
//! call consult the stack to attribute their effects to the call site that
//! started it.
//!
//! Frames can only be pushed through [`with_entry_point`], whose drop guard
//! makes an unbalanced stack impossible.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::scope::ScopeKind;

/// Kind of call an entry point was opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryPointKind {
    SetProperty,
    GetProperty,
    Call,
}

impl From<ScopeKind> for EntryPointKind {
    fn from(kind: ScopeKind) -> Self {
        match kind {
            ScopeKind::PropertyRead => EntryPointKind::GetProperty,
            ScopeKind::PropertyWrite => EntryPointKind::SetProperty,
            ScopeKind::MethodCall => EntryPointKind::Call,
        }
    }
}

impl fmt::Display for EntryPointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryPointKind::SetProperty => "SET_PROPERTY",
            EntryPointKind::GetProperty => "GET_PROPERTY",
            EntryPointKind::Call => "CALL",
        };
        f.write_str(s)
    }
}

/// An in-flight intercepted call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub consumer: String,
    pub name: String,
    pub kind: EntryPointKind,
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} from {}", self.kind, self.name, self.consumer)
    }
}

struct Frame {
    entry: EntryPoint,
    // Set once a nested interceptor has attributed this call to its consumer
    claimed: bool,
}

thread_local! {
    static STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Pops the frame it was created for. Tied to the creating thread.
struct FrameGuard {
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        // The thread-local may already be gone during thread teardown
        let _ = STACK.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            debug_assert_eq!(stack.len(), self.depth, "entry-point frames popped out of order");
            stack.truncate(self.depth.saturating_sub(1));
            trace!("left entry point, depth {}", stack.len());
        });
    }
}

fn enter(consumer: &str, name: &str, kind: EntryPointKind) -> FrameGuard {
    let depth = STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        stack.push(Frame {
            entry: EntryPoint {
                consumer: consumer.to_string(),
                name: name.to_string(),
                kind,
            },
            claimed: false,
        });
        stack.len()
    });
    trace!("entered {} {} from {}, depth {}", kind, name, consumer, depth);
    FrameGuard {
        depth,
        _not_send: PhantomData,
    }
}

/// Run `body` with an entry point for `name` on top of this thread's stack.
///
/// The frame is popped on every exit path: normal return, an `Err` returned
/// by `body`, and unwinding.
pub fn with_entry_point<R>(
    consumer: &str,
    name: &str,
    kind: EntryPointKind,
    body: impl FnOnce() -> R,
) -> R {
    let _guard = enter(consumer, name, kind);
    body()
}

/// The innermost in-flight entry point on this thread.
pub fn current_entry_point() -> Option<EntryPoint> {
    STACK.with(|stack| stack.borrow().last().map(|frame| frame.entry.clone()))
}

/// Number of in-flight entry points on this thread.
pub fn depth() -> usize {
    STACK.with(|stack| stack.borrow().len())
}

/// All in-flight entry points on this thread, outermost first.
pub fn snapshot() -> Vec<EntryPoint> {
    STACK.with(|stack| stack.borrow().iter().map(|frame| frame.entry.clone()).collect())
}

/// Whether the innermost entry point is a `kind` call of `name`.
pub fn is_current_call(name: &str, kind: EntryPointKind) -> bool {
    STACK.with(|stack| {
        stack
            .borrow()
            .last()
            .is_some_and(|frame| frame.entry.kind == kind && frame.entry.name == name)
    })
}

/// Claim the innermost entry point for a nested interceptor.
///
/// Returns the consumer that opened the innermost frame if it is a `kind`
/// call of `name` that nothing has claimed yet, and marks it claimed. A
/// second claim of the same frame returns `None`, so a nested effect is
/// attributed to its origin exactly once.
pub fn find_caller_for_current_call_if_not_intercepted(
    name: &str,
    kind: EntryPointKind,
) -> Option<String> {
    STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        let frame = stack.last_mut()?;
        if frame.claimed || frame.entry.kind != kind || frame.entry.name != name {
            return None;
        }
        frame.claimed = true;
        Some(frame.entry.consumer.clone())
    })
}
