//! Call scopes
//!
//! A [`CallScope`] is the identity of a *kind* of interceptable call: a read
//! of a property, a write to a property, or a call of a method, keyed by name
//! and, for methods, optionally by arity. Scopes are the keys of the
//! interceptor registry, so equality and hashing are structural and stable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The shape of a dynamically dispatched call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeKind {
    PropertyRead,
    PropertyWrite,
    MethodCall,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::PropertyRead => "property-read",
            ScopeKind::PropertyWrite => "property-write",
            ScopeKind::MethodCall => "method-call",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScopeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "property-read" | "read" => Ok(ScopeKind::PropertyRead),
            "property-write" | "write" => Ok(ScopeKind::PropertyWrite),
            "method-call" | "call" => Ok(ScopeKind::MethodCall),
            other => Err(format!(
                "unknown call kind '{}' (expected property-read, property-write or method-call)",
                other
            )),
        }
    }
}

/// Immutable identity of an interceptable call.
///
/// Two scopes are equal iff kind, name and arity all match. A scope without
/// an arity is a distinct key from any scope with one: a lookup for
/// `exec/1` never falls back to a registration for `exec`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallScope {
    kind: ScopeKind,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arity: Option<usize>,
}

impl CallScope {
    pub fn new(kind: ScopeKind, name: impl Into<String>, arity: Option<usize>) -> Self {
        Self {
            kind,
            name: name.into(),
            arity,
        }
    }

    pub fn reads_of_properties_named(name: impl Into<String>) -> Self {
        Self::new(ScopeKind::PropertyRead, name, None)
    }

    pub fn writes_of_properties_named(name: impl Into<String>) -> Self {
        Self::new(ScopeKind::PropertyWrite, name, None)
    }

    pub fn method_calls_named(name: impl Into<String>) -> Self {
        Self::new(ScopeKind::MethodCall, name, None)
    }

    pub fn method_calls_with_arity(name: impl Into<String>, arity: usize) -> Self {
        Self::new(ScopeKind::MethodCall, name, Some(arity))
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Option<usize> {
        self.arity
    }
}

impl fmt::Display for CallScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arity {
            Some(arity) => write!(f, "{} {}/{}", self.kind, self.name, arity),
            None => write!(f, "{} {}", self.kind, self.name),
        }
    }
}
