//! Untyped engine values.
//!
//! This module defines `Value`, the dynamically typed cell the embedded
//! engine hands to callbacks, and the codec traits that convert it to and
//! from concrete Rust types.

mod codec;

pub use codec::{FromValue, ToValue};

use std::fmt;

/// Storage class of an engine value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    /// NULL.
    Null,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit floating point.
    Real,
    /// UTF-8 text.
    Text,
    /// Raw bytes.
    Blob,
}

impl ValueType {
    /// Returns the SQL name of this storage class.
    pub fn sql_name(self) -> &'static str {
        match self {
            ValueType::Null => "NULL",
            ValueType::Integer => "INTEGER",
            ValueType::Real => "REAL",
            ValueType::Text => "TEXT",
            ValueType::Blob => "BLOB",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// A raw value as produced by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value.
    Null,
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Real(f64),
    /// Text value.
    Text(String),
    /// Binary data.
    Blob(Vec<u8>),
}

impl Value {
    /// Creates a NULL value.
    pub fn null() -> Self {
        Value::Null
    }

    /// Creates an integer value.
    pub fn integer(v: i64) -> Self {
        Value::Integer(v)
    }

    /// Creates a real value.
    pub fn real(v: f64) -> Self {
        Value::Real(v)
    }

    /// Creates a text value.
    pub fn text(v: impl Into<String>) -> Self {
        Value::Text(v.into())
    }

    /// Creates a blob value.
    pub fn blob(v: impl Into<Vec<u8>>) -> Self {
        Value::Blob(v.into())
    }

    /// Returns the storage class of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Integer(_) => ValueType::Integer,
            Value::Real(_) => ValueType::Real,
            Value::Text(_) => ValueType::Text,
            Value::Blob(_) => ValueType::Blob,
        }
    }

    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this value is an integer.
    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    /// Returns true if this value is a real.
    pub fn is_real(&self) -> bool {
        matches!(self, Value::Real(_))
    }

    /// Returns true if this value is text.
    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    /// Returns true if this value is a blob.
    pub fn is_blob(&self) -> bool {
        matches!(self, Value::Blob(_))
    }

    /// Returns the integer payload, if any.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the real payload, if any.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the text payload, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the blob payload, if any.
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Short description used in decode errors.
    pub(crate) fn describe(&self) -> String {
        const MAX_EXCERPT: usize = 32;
        match self {
            Value::Null => "NULL".to_string(),
            Value::Integer(i) => format!("INTEGER {}", i),
            Value::Real(f) => format!("REAL {}", f),
            Value::Text(s) => {
                let excerpt: String = s.chars().take(MAX_EXCERPT).collect();
                if excerpt.len() < s.len() {
                    format!("TEXT '{}...'", excerpt)
                } else {
                    format!("TEXT '{}'", excerpt)
                }
            }
            Value::Blob(b) => format!("BLOB ({} bytes)", b.len()),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Blob(b) => {
                write!(f, "X'")?;
                for byte in b {
                    write!(f, "{:02X}", byte)?;
                }
                write!(f, "'")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_null() {
        let v = Value::null();
        assert!(v.is_null());
        assert_eq!(v.value_type(), ValueType::Null);
        assert_eq!(Value::default(), Value::Null);
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::integer(7).as_integer(), Some(7));
        assert_eq!(Value::real(1.5).as_real(), Some(1.5));
        assert_eq!(Value::text("one").as_text(), Some("one"));
        assert_eq!(Value::blob(vec![1u8, 2]).as_blob(), Some(&[1u8, 2][..]));
        assert_eq!(Value::text("one").as_integer(), None);
        assert!(Value::integer(1).is_integer());
        assert!(Value::real(1.0).is_real());
        assert!(Value::text("").is_text());
        assert!(Value::blob(Vec::new()).is_blob());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::integer(-3).to_string(), "-3");
        assert_eq!(Value::text("it's").to_string(), "'it''s'");
        assert_eq!(Value::blob(vec![0xDEu8, 0xAD]).to_string(), "X'DEAD'");
    }

    #[test]
    fn test_value_describe() {
        assert_eq!(Value::text("abc").describe(), "TEXT 'abc'");
        let long = "x".repeat(40);
        assert!(Value::text(long).describe().ends_with("...'"));
        assert_eq!(Value::blob(vec![0u8; 4]).describe(), "BLOB (4 bytes)");
    }

    #[test]
    fn test_value_type_names() {
        assert_eq!(ValueType::Integer.to_string(), "INTEGER");
        assert_eq!(ValueType::Blob.sql_name(), "BLOB");
    }
}
