//! Dynamic call argument values
//!
//! Calls flowing through the redirect pipeline carry their arguments as
//! dynamic [`Value`]s so that one engine can serve any proxied contract.
//! Constraint matching compares these values structurally.

use serde::{Deserialize, Serialize};

/// A dynamic value carried in a call's argument vector or returned from a
/// handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// The absence of a value (void returns, unset payloads)
    Unit,

    // Primitives
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    S8(i8),
    S16(i16),
    S32(i32),
    S64(i64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),

    // Compound values
    List(Vec<Value>),
    Option(Option<Box<Value>>),
    Tuple(Vec<Value>),
    Record {
        type_name: String,
        fields: Vec<(String, Value)>,
    },
}

impl Value {
    /// Helper to build a record value.
    pub fn record<S: Into<String>>(type_name: impl Into<String>, fields: Vec<(S, Value)>) -> Self {
        Value::Record {
            type_name: type_name.into(),
            fields: fields.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }

    /// Helper to build an option value.
    pub fn some(inner: Value) -> Self {
        Value::Option(Some(Box::new(inner)))
    }

    /// Helper to build an empty option value.
    pub fn none() -> Self {
        Value::Option(None)
    }

    /// Check if this value is Unit.
    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }

    /// Read this value as an i64 if it carries a signed integer.
    pub fn as_s64(&self) -> Option<i64> {
        match self {
            Value::S8(v) => Some(i64::from(*v)),
            Value::S16(v) => Some(i64::from(*v)),
            Value::S32(v) => Some(i64::from(*v)),
            Value::S64(v) => Some(*v),
            _ => None,
        }
    }

    /// Read this value as a string slice if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::U8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::S8(v) => write!(f, "{}", v),
            Value::S16(v) => write!(f, "{}", v),
            Value::S32(v) => write!(f, "{}", v),
            Value::S64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{:?}", v),
            Value::String(v) => write!(f, "{:?}", v),
            // Compound values render as JSON for debugging
            other => match serde_json::to_string(other) {
                Ok(json) => write!(f, "{}", json),
                Err(_) => write!(f, "{:?}", other),
            },
        }
    }
}

// From implementations for primitive types
impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::S8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::S16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::S32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::S64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}
