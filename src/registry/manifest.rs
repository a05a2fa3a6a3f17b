//! Declarative registration manifests
//!
//! A manifest is the declarative source a resolver is built from. It lists
//! scope-to-action bindings in JSON:
//!
//! ```json
//! {
//!   "duplicates": "last-wins",
//!   "interceptors": [
//!     { "kind": "property-write", "name": "version", "action": "record", "track": true },
//!     { "kind": "method-call", "name": "exec", "arity": 1, "action": { "substitute": 0 } }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dyncall_value::Value;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{DuplicatePolicy, InterceptorResolver};
use crate::error::RegistryError;
use crate::intercept::{recording, substitute, CallInterceptor, CallLog, Passthrough, Tracked};
use crate::scope::{CallScope, ScopeKind};

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// What a manifest entry does with matching calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    #[default]
    Passthrough,
    Record,
    Substitute(Value),
}

/// One scope-to-action binding. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    pub kind: ScopeKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arity: Option<usize>,
    #[serde(default)]
    pub action: Action,
    /// Open an entry point around the interceptor.
    #[serde(default)]
    pub track: bool,
}

impl ManifestEntry {
    pub fn scope(&self) -> CallScope {
        CallScope::new(self.kind, self.name.clone(), self.arity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
    #[serde(default)]
    pub interceptors: Vec<ManifestEntry>,
}

/// A resolver built from a manifest, plus the log its `record` entries
/// write to.
#[derive(Debug)]
pub struct LoadedManifest {
    pub resolver: InterceptorResolver,
    pub log: Arc<CallLog>,
}

impl Manifest {
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a resolver with one interceptor per entry.
    pub fn build(&self) -> Result<LoadedManifest, ManifestError> {
        let log = Arc::new(CallLog::new());
        let mut builder = InterceptorResolver::builder().duplicate_policy(self.duplicates);

        for entry in &self.interceptors {
            let scope = entry.scope();
            let interceptor: Arc<dyn CallInterceptor> = match &entry.action {
                Action::Passthrough => Arc::new(Passthrough::new([scope])),
                Action::Record => Arc::new(recording([scope], Arc::clone(&log))),
                Action::Substitute(value) => Arc::new(substitute([scope], value.clone())),
            };
            let interceptor: Arc<dyn CallInterceptor> = if entry.track {
                Arc::new(Tracked::new(interceptor))
            } else {
                interceptor
            };
            builder = builder.register_shared(interceptor);
        }

        Ok(LoadedManifest {
            resolver: builder.build()?,
            log,
        })
    }
}
