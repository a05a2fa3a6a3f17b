//! dyncall: transparent interception of dynamically dispatched calls
//!
//! A dynamically-typed caller writes properties, reads them and calls
//! methods by name. This crate lets a host observe, redirect or augment
//! those calls without either side knowing, and falls back to the unmodified
//! call whenever no interception applies.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ call site (dispatch)                         │
//! │   name known? ── no ──▶ original call        │
//! │       │ yes                                  │
//! │   interceptor for scope? ── no ──▶ original  │
//! │       │ yes                                  │
//! │   Invocation ──▶ CallInterceptor             │
//! ├──────────────────────────────────────────────┤
//! │ registry    - scope → interceptor, frozen    │
//! │ entry_point - per-thread in-flight calls     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dyncall::{dispatch, intercept, CallScope, InterceptorResolver, Value};
//!
//! let log = Arc::new(intercept::CallLog::new());
//! let resolver = InterceptorResolver::builder()
//!     .register(intercept::recording([CallScope::writes_of_properties_named("version")], log.clone()))
//!     .build()?;
//!
//! dispatch::set_property(&resolver, project_ref, "version", "1.0".into(), "build.gradle", || {
//!     project.set("version", "1.0")
//! })?;
//! assert_eq!(log.len(), 1);
//! ```

pub mod dispatch;
pub mod entry_point;
pub mod error;
pub mod intercept;
pub mod invocation;
pub mod registry;
pub mod scope;

pub use dispatch::{CallSite, Dispatch};
pub use dyncall_value::{ConversionError, ObjectRef, Value};
pub use entry_point::{current_entry_point, with_entry_point, EntryPoint, EntryPointKind};
pub use error::{CallError, CallResult, RegistryError};
pub use intercept::CallInterceptor;
pub use invocation::Invocation;
pub use registry::{DuplicatePolicy, InterceptorResolver, Manifest};
pub use scope::{CallScope, ScopeKind};
