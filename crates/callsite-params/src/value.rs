//! Runtime value types for resolved parameters.
//!
//! The [`Value`] enum represents a dynamically-typed parameter value as it
//! travels from a request origin to a method call. Every value reports its
//! [`ValueKind`], which is what overload selection compares against declared
//! parameter types.

use std::fmt;

use serde::Serialize;
use time::OffsetDateTime;

/// Type tag for a [`Value`].
///
/// # Example
///
/// ```
/// use callsite_params::{Value, ValueKind};
///
/// assert_eq!(Value::from(42i64).kind(), ValueKind::Int);
/// assert_eq!(ValueKind::Int.name(), "int");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Text.
    String,
    /// Boolean.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit float.
    Double,
    /// Point in time with an offset.
    DateTime,
    /// List of strings.
    StringList,
}

impl ValueKind {
    /// Short type name used in signatures, e.g. `Find(string, int)`.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Double => "double",
            ValueKind::DateTime => "datetime",
            ValueKind::StringList => "string[]",
        }
    }

    /// Human-readable description used in error messages.
    pub fn description(&self) -> &'static str {
        match self {
            ValueKind::String => "a string",
            ValueKind::Bool => "a boolean",
            ValueKind::Int => "an integer",
            ValueKind::Double => "a double",
            ValueKind::DateTime => "a datetime",
            ValueKind::StringList => "a string list",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dynamically-typed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Text value.
    String(String),
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Double(f64),
    /// Timestamp value, serialized as RFC 3339.
    DateTime(#[serde(with = "time::serde::rfc3339")] OffsetDateTime),
    /// List of strings.
    StringList(Vec<String>),
}

impl Value {
    /// The kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Double(_) => ValueKind::Double,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::StringList(_) => ValueKind::StringList,
        }
    }

    /// Presence rule used by resolver chains.
    ///
    /// Strings count as present only when non-empty; every other kind is
    /// present as soon as a value exists.
    pub fn is_present(&self) -> bool {
        match self {
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extracts the integer value, if present.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Extracts the double value, if present.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Extracts the timestamp value, if present.
    pub fn as_datetime(&self) -> Option<OffsetDateTime> {
        match self {
            Value::DateTime(t) => Some(*t),
            _ => None,
        }
    }

    /// Extracts the string list, if present.
    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            Value::StringList(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{}", d),
            Value::DateTime(t) => write!(f, "{}", t),
            Value::StringList(items) => write!(f, "{:?}", items),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(t: OffsetDateTime) -> Self {
        Value::DateTime(t)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::StringList(items)
    }
}

/// Rust types that can be produced from a [`Value`] of one fixed kind.
///
/// This is the per-type table that generic resolution and typed method
/// arguments are built on: [`KIND`](Self::KIND) selects which typed resolve
/// path runs, and [`from_value`](Self::from_value) unwraps the result.
pub trait FromParam: Sized {
    /// The kind this type is resolved as.
    const KIND: ValueKind;

    /// Converts a value of kind [`KIND`](Self::KIND) into `Self`.
    ///
    /// Returns `None` when the value has a different kind.
    fn from_value(value: Value) -> Option<Self>;
}

impl FromParam for String {
    const KIND: ValueKind = ValueKind::String;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl FromParam for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromParam for i64 {
    const KIND: ValueKind = ValueKind::Int;

    fn from_value(value: Value) -> Option<Self> {
        value.as_int()
    }
}

impl FromParam for i32 {
    const KIND: ValueKind = ValueKind::Int;

    fn from_value(value: Value) -> Option<Self> {
        value.as_int().and_then(|i| i32::try_from(i).ok())
    }
}

impl FromParam for f64 {
    const KIND: ValueKind = ValueKind::Double;

    fn from_value(value: Value) -> Option<Self> {
        value.as_double()
    }
}

impl FromParam for OffsetDateTime {
    const KIND: ValueKind = ValueKind::DateTime;

    fn from_value(value: Value) -> Option<Self> {
        value.as_datetime()
    }
}

impl FromParam for Vec<String> {
    const KIND: ValueKind = ValueKind::StringList;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::StringList(items) => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Value::from("x").kind(), ValueKind::String);
        assert_eq!(Value::from(true).kind(), ValueKind::Bool);
        assert_eq!(Value::from(1i64).kind(), ValueKind::Int);
        assert_eq!(Value::from(1.5).kind(), ValueKind::Double);
        assert_eq!(
            Value::from(datetime!(2024-01-02 03:04:05 UTC)).kind(),
            ValueKind::DateTime
        );
        assert_eq!(
            Value::from(vec!["a".to_string()]).kind(),
            ValueKind::StringList
        );
    }

    #[test]
    fn empty_string_is_not_present() {
        assert!(!Value::from("").is_present());
        assert!(Value::from(" ").is_present());
        assert!(Value::from(false).is_present());
        assert!(Value::from(0i64).is_present());
    }

    #[test]
    fn from_param_rejects_other_kinds() {
        assert_eq!(i64::from_value(Value::from("10")), None);
        assert_eq!(String::from_value(Value::from(10i64)), None);
        assert_eq!(i64::from_value(Value::from(10i64)), Some(10));
        assert_eq!(bool::from_value(Value::from(true)), Some(true));
    }

    #[test]
    fn display_quotes_strings() {
        assert_eq!(Value::from("*").to_string(), "\"*\"");
        assert_eq!(Value::from(10i64).to_string(), "10");
    }
}
