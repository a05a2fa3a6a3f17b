//! Interceptor registry
//!
//! The registry has a two-phase lifecycle: a resolver is built from a fixed
//! set of registrations, then frozen. [`install`] is the explicit
//! initialization step that publishes a resolver process-wide; call sites
//! that do not carry their own resolver read it through [`installed`].

mod manifest;
mod resolver;

pub use manifest::{Action, LoadedManifest, Manifest, ManifestEntry, ManifestError};
pub use resolver::{DuplicatePolicy, InterceptorResolver, ResolverBuilder};

use std::sync::OnceLock;

use log::debug;

use crate::error::RegistryError;

static INTERCEPTOR_RESOLVER: OnceLock<InterceptorResolver> = OnceLock::new();

/// Publish `resolver` as the process-wide resolver.
///
/// Fails if a resolver was already installed, or if [`installed`] has already
/// frozen the empty resolver.
pub fn install(resolver: InterceptorResolver) -> Result<&'static InterceptorResolver, RegistryError> {
    INTERCEPTOR_RESOLVER
        .set(resolver)
        .map_err(|_| RegistryError::AlreadyInstalled)?;
    debug!("installed process-wide interceptor resolver");
    INTERCEPTOR_RESOLVER.get().ok_or(RegistryError::AlreadyInstalled)
}

/// The process-wide resolver.
///
/// If nothing was installed yet, an empty resolver is frozen in its place and
/// every later [`install`] fails.
pub fn installed() -> &'static InterceptorResolver {
    INTERCEPTOR_RESOLVER.get_or_init(InterceptorResolver::empty)
}

pub fn is_installed() -> bool {
    INTERCEPTOR_RESOLVER.get().is_some()
}
