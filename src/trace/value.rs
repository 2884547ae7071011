//! Typed values recovered from jdb output
//!
//! This module defines the [`TypedValue`] enum, the closed set of shapes a
//! token printed by jdb can be recovered as. jdb prints everything as text;
//! the parser in [`crate::parser::value`] decides which variant a token is.
//!
//! # Value Types
//!
//! - [`TypedValue::Null`]: `null` and `<void value>`
//! - [`TypedValue::Bool`]: `true` / `false`
//! - [`TypedValue::Int`]: any token that parses as a 64-bit integer
//! - [`TypedValue::Float`]: any token that parses as a double
//! - [`TypedValue::String`]: quoted strings and chars, and the fallback for unknown text
//! - [`TypedValue::Array`]: `{a, b, c}` literals
//! - [`TypedValue::ObjectReference`]: `instance of ...` placeholders, kept verbatim
//!
//! Objects are never expanded: an object reference is an opaque string.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;

/// Variable name -> value, as printed by `locals`
pub type Variables = FxHashMap<String, TypedValue>;

/// A value printed by the debugger
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<TypedValue>),
    ObjectReference(String),
}

impl TypedValue {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    /// Get the integer value, returns None if not an Int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            TypedValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the float value; integers widen
    pub fn as_float(&self) -> Option<f64> {
        match self {
            TypedValue::Float(x) => Some(*x),
            TypedValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the text of a string or object reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) | TypedValue::ObjectReference(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[TypedValue]> {
        match self {
            TypedValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Check if this value is an opaque object reference
    pub fn is_object_reference(&self) -> bool {
        matches!(self, TypedValue::ObjectReference(_))
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Null => write!(f, "null"),
            TypedValue::Bool(b) => write!(f, "{}", b),
            TypedValue::Int(n) => write!(f, "{}", n),
            TypedValue::Float(x) => write!(f, "{}", x),
            TypedValue::String(s) => write!(f, "\"{}\"", s),
            TypedValue::ObjectReference(s) => write!(f, "{}", s),
            TypedValue::Array(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_nested_array() {
        let value = TypedValue::Array(vec![
            TypedValue::Int(1),
            TypedValue::String("a".to_string()),
            TypedValue::Array(vec![TypedValue::Null]),
        ]);
        assert_eq!(value.to_string(), "{1, \"a\", {null}}");
    }

    #[test]
    fn test_json_shape_is_untagged() {
        let value = TypedValue::Array(vec![
            TypedValue::Int(3),
            TypedValue::Bool(false),
            TypedValue::Null,
        ]);
        assert_eq!(serde_json::to_string(&value).unwrap(), "[3,false,null]");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(TypedValue::Int(4).as_float(), Some(4.0));
        assert_eq!(TypedValue::Float(0.5).as_int(), None);
        assert!(TypedValue::ObjectReference("instance of Foo(id=1)".into()).is_object_reference());
        assert_eq!(TypedValue::String("x".into()).as_str(), Some("x"));
    }
}
