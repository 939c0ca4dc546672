//! Scalar Values
//!
//! Every cell returned by InfluxDB and every filter operand sent by a caller
//! is one of four JSON scalar shapes. Arrays and objects are rejected when
//! the JSON is decoded.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A single dynamically typed cell
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub enum Scalar {
    /// JSON `null`
    #[default]
    Null,
    /// JSON boolean
    Bool(bool),
    /// JSON number, integers stay integers
    Number(serde_json::Number),
    /// JSON string
    String(String),
}

impl Scalar {
    /// Check if this is `null`
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the string payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl TryFrom<serde_json::Value> for Scalar {
    type Error = String;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Null => Ok(Self::Null),
            serde_json::Value::Bool(b) => Ok(Self::Bool(b)),
            serde_json::Value::Number(n) => Ok(Self::Number(n)),
            serde_json::Value::String(s) => Ok(Self::String(s)),
            serde_json::Value::Array(_) => Err("expected a scalar, found an array".to_string()),
            serde_json::Value::Object(_) => Err("expected a scalar, found an object".to_string()),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
        }
    }
}

/// Plain text rendering, strings are not quoted
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<f64> for Scalar {
    /// Non-finite floats have no JSON form and become `null`
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n)
            .map(Self::Number)
            .unwrap_or(Self::Null)
    }
}
