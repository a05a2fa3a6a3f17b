//! Interceptor resolution
//!
//! [`InterceptorResolver`] is the single authority call sites ask about
//! interception. It is built once from a list of registrations and never
//! changes afterwards, so any number of threads can read it without locks.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::dispatch::DispatchStats;
use crate::error::RegistryError;
use crate::intercept::CallInterceptor;
use crate::scope::CallScope;

/// What to do when two registrations name the same scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The last registration replaces earlier ones.
    #[default]
    LastWins,
    /// Building the resolver fails.
    Reject,
}

/// Immutable map from [`CallScope`] to [`CallInterceptor`].
pub struct InterceptorResolver {
    interceptors: HashMap<CallScope, Arc<dyn CallInterceptor>>,
    names: HashSet<String>,
    stats: DispatchStats,
}

impl InterceptorResolver {
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    /// A resolver that intercepts nothing.
    pub fn empty() -> Self {
        Self {
            interceptors: HashMap::new(),
            names: HashSet::new(),
            stats: DispatchStats::default(),
        }
    }

    /// Whether any scope, of any kind or arity, is registered under `name`.
    ///
    /// Call sites use this as a cheap guard before building a scope. It never
    /// reports `false` for a name that has an interceptor.
    pub fn is_aware_of_call_site_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// The interceptor registered for exactly `scope`, if any.
    ///
    /// A scope with the same name but a different kind or arity is not a
    /// match.
    pub fn resolve_call_interceptor(&self, scope: &CallScope) -> Option<&Arc<dyn CallInterceptor>> {
        self.interceptors.get(scope)
    }

    /// Registered scopes, sorted.
    pub fn scopes(&self) -> Vec<&CallScope> {
        let mut scopes: Vec<_> = self.interceptors.keys().collect();
        scopes.sort();
        scopes
    }

    /// Names the resolver is aware of, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }
}

impl Default for InterceptorResolver {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for InterceptorResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.scopes().into_iter().map(|scope| {
                let name = self.interceptors.get(scope).map(|i| i.name()).unwrap_or_default();
                (scope.to_string(), name)
            }))
            .finish()
    }
}

/// Collects registrations for an [`InterceptorResolver`].
///
/// # Example
///
/// ```ignore
/// let log = Arc::new(CallLog::new());
/// let resolver = InterceptorResolver::builder()
///     .register(recording([CallScope::writes_of_properties_named("version")], log.clone()))
///     .register(substitute([CallScope::reads_of_properties_named("buildDir")], "/tmp/build"))
///     .build()?;
/// ```
pub struct ResolverBuilder {
    registrations: Vec<(CallScope, Arc<dyn CallInterceptor>)>,
    unbound: Vec<String>,
    policy: DuplicatePolicy,
}

impl ResolverBuilder {
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
            unbound: Vec::new(),
            policy: DuplicatePolicy::default(),
        }
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register `interceptor` for every scope it reports.
    pub fn register<I: CallInterceptor + 'static>(self, interceptor: I) -> Self {
        self.register_shared(Arc::new(interceptor))
    }

    /// Register an already shared interceptor for every scope it reports.
    pub fn register_shared(mut self, interceptor: Arc<dyn CallInterceptor>) -> Self {
        let scopes = interceptor.scopes();
        if scopes.is_empty() {
            self.unbound.push(interceptor.name().to_string());
            return self;
        }
        for scope in scopes {
            self.registrations.push((scope, Arc::clone(&interceptor)));
        }
        self
    }

    /// Register `interceptor` for `scope` only, whatever scopes it reports.
    pub fn register_for(mut self, scope: CallScope, interceptor: Arc<dyn CallInterceptor>) -> Self {
        self.registrations.push((scope, interceptor));
        self
    }

    pub fn build(self) -> Result<InterceptorResolver, RegistryError> {
        if let Some(name) = self.unbound.into_iter().next() {
            return Err(RegistryError::Unbound(name));
        }

        let mut interceptors: HashMap<CallScope, Arc<dyn CallInterceptor>> = HashMap::new();
        let mut names = HashSet::new();
        for (scope, interceptor) in self.registrations {
            names.insert(scope.name().to_string());
            if let Some(existing) = interceptors.get(&scope) {
                match self.policy {
                    DuplicatePolicy::Reject => {
                        return Err(RegistryError::DuplicateScope {
                            existing: existing.name().to_string(),
                            duplicate: interceptor.name().to_string(),
                            scope,
                        });
                    }
                    DuplicatePolicy::LastWins => {
                        debug!(
                            "{} replaces {} for {}",
                            interceptor.name(),
                            existing.name(),
                            scope
                        );
                    }
                }
            }
            interceptors.insert(scope, interceptor);
        }

        debug!(
            "built interceptor resolver: {} scope(s), {} name(s)",
            interceptors.len(),
            names.len()
        );
        Ok(InterceptorResolver {
            interceptors,
            names,
            stats: DispatchStats::default(),
        })
    }
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}
