//! Runtime values

use std::collections::BTreeMap;
use std::fmt;

use crate::ConversionError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque handle to a host object.
///
/// Two handles are equal when they name the same object, regardless of the
/// object's current state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct ObjectRef {
    pub type_name: String,
    pub id: u64,
}

impl ObjectRef {
    pub fn new(type_name: impl Into<String>, id: u64) -> Self {
        Self {
            type_name: type_name.into(),
            id,
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.type_name, self.id)
    }
}

/// A dynamically-typed value
///
/// With the `serde` feature the encoding is untagged, which is lossy in one
/// place: a `Map` whose only keys are `type_name` (a string) and `id` (an
/// unsigned integer) decodes as `Object`. Values written by hand, such as a
/// manifest's `substitute` value, should avoid that shape when a map is meant.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    // Must precede Map so that untagged decoding prefers object handles
    Object(ObjectRef),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn object(type_name: impl Into<String>, id: u64) -> Self {
        Value::Object(ObjectRef::new(type_name, id))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the runtime type, as reported in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(obj) => &obj.type_name,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Object(obj) => write!(f, "{}", obj),
        }
    }
}

// ============================================================================
// From implementations
// ============================================================================

impl From<()> for Value {
    fn from(_: ()) -> Self { Value::Null }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self { Value::Bool(v) }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self { Value::Int(v as i64) }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self { Value::Int(v) }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self { Value::Int(v as i64) }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self { Value::Float(v) }
}

impl From<String> for Value {
    fn from(v: String) -> Self { Value::String(v) }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self { Value::String(String::from(v)) }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self { Value::Object(v) }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<V: Into<Value>> From<BTreeMap<String, V>> for Value {
    fn from(v: BTreeMap<String, V>) -> Self {
        Value::Map(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

// ============================================================================
// TryFrom implementations
// ============================================================================

fn mismatch(expected: &str, got: &Value) -> ConversionError {
    ConversionError::TypeMismatch {
        expected: String::from(expected),
        got: format!("{:?}", got),
    }
}

impl TryFrom<Value> for bool {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Bool(x) => Ok(x),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Int(x) => Ok(x),
            other => Err(mismatch("int", &other)),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Float(x) => Ok(x),
            // Integers widen silently, as a dynamic caller would expect
            Value::Int(x) => Ok(x as f64),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::String(x) => Ok(x),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl TryFrom<Value> for ObjectRef {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Object(x) => Ok(x),
            other => Err(mismatch("object", &other)),
        }
    }
}

impl<T: TryFrom<Value, Error = ConversionError>> TryFrom<Value> for Vec<T> {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    T::try_from(item).map_err(|e| ConversionError::IndexError(i, Box::new(e)))
                })
                .collect(),
            other => Err(ConversionError::ExpectedList(format!("{:?}", other))),
        }
    }
}

impl<T: TryFrom<Value, Error = ConversionError>> TryFrom<Value> for BTreeMap<String, T> {
    type Error = ConversionError;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(key, value)| match T::try_from(value) {
                    Ok(value) => Ok((key, value)),
                    Err(e) => Err(ConversionError::EntryError(key, Box::new(e))),
                })
                .collect(),
            other => Err(ConversionError::ExpectedMap(format!("{:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_maps_none_to_null() {
        assert!(Value::from(None::<i64>).is_null());
        let some = Value::from(Some("x"));
        assert!(!some.is_null());
        assert_eq!(some.as_str(), Some("x"));
    }

    #[test]
    fn list_conversion_reports_failing_index() {
        let list = Value::List(vec![Value::Int(1), Value::String("two".into())]);
        let err = Vec::<i64>::try_from(list).unwrap_err();
        assert!(matches!(err, ConversionError::IndexError(1, _)));
    }

    #[test]
    fn float_accepts_int() {
        assert_eq!(f64::try_from(Value::Int(3)).unwrap(), 3.0);
    }

    #[test]
    fn object_type_name_is_reported() {
        let project = Value::object("Project", 7);
        assert_eq!(project.type_name(), "Project");
        assert_eq!(project.to_string(), "Project@7");
        assert_eq!(project.as_object(), Some(&ObjectRef::new("Project", 7)));
        assert_eq!(Value::from("Project").as_object(), None);
    }

    #[test]
    fn display_nests_collections() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), Value::from(vec![1i64, 2]));
        assert_eq!(Value::Map(map).to_string(), "{a: [1, 2]}");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn untagged_json_prefers_int_and_object() {
        let v: Value = serde_json::from_str("0").unwrap();
        assert_eq!(v, Value::Int(0));
        let v: Value = serde_json::from_str(r#"{"type_name":"Project","id":1}"#).unwrap();
        assert_eq!(v, Value::object("Project", 1));
        let v: Value = serde_json::from_str(r#"{"type_name":"Project"}"#).unwrap();
        assert!(matches!(v, Value::Map(_)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn map_shaped_like_a_handle_decodes_as_object() {
        let mut map = BTreeMap::new();
        map.insert("type_name".to_string(), Value::from("Project"));
        map.insert("id".to_string(), Value::Int(1));
        let json = serde_json::to_string(&Value::Map(map)).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::object("Project", 1));

        let mut map = BTreeMap::new();
        map.insert("type_name".to_string(), Value::from("Project"));
        map.insert("id".to_string(), Value::Int(1));
        map.insert("path".to_string(), Value::from(":app"));
        let json = serde_json::to_string(&Value::Map(map.clone())).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::Map(map));
    }
}
