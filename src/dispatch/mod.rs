//! Call-site dispatch
//!
//! Every interceptable call site runs the same decision sequence:
//!
//! ```text
//! Unchecked ── name unknown ──────────────────────────▶ Direct (original call)
//!     │
//!     ▼ name known
//! AwarenessChecked ── no interceptor for exact scope ──▶ Fallback (original call)
//!     │
//!     ▼ interceptor found
//! Resolved ── build Invocation, do_intercept ──────────▶ Dispatched
//! ```
//!
//! Nothing is retried: a failing original call or a failing interceptor ends
//! the sequence and the failure is returned to the caller as is.

mod callsite;
mod stats;

pub use callsite::{get_property, invoke_method, set_property, set_tracked_property, CallSite, Dispatch};
pub use stats::{DispatchCounts, DispatchStats};
