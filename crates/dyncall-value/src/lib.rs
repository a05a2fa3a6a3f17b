//! Values that cross the dyncall interception boundary.
//!
//! A dynamically-typed caller hands the interception layer a receiver and a
//! list of arguments whose types are only known at runtime. This crate gives
//! them one concrete shape, [`Value`], so that interceptors can inspect,
//! record and substitute them without knowing the host's object model.
//!
//! Objects owned by the host are never copied across the boundary. They are
//! represented by an opaque [`ObjectRef`] handle carrying only a type name and
//! an identity.

mod value;

pub use value::{ObjectRef, Value};

use thiserror::Error;

/// Error converting a [`Value`] into a concrete Rust type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("expected list, got {0}")]
    ExpectedList(String),

    #[error("expected map, got {0}")]
    ExpectedMap(String),

    #[error("list element {0}: {1}")]
    IndexError(usize, Box<ConversionError>),

    #[error("map entry {0:?}: {1}")]
    EntryError(String, Box<ConversionError>),
}
