use std::collections::HashMap;

use rust_decimal::{Decimal, prelude::FromPrimitive};
use serde::Deserialize;

/// A JSON value as stored in a document or bound as a query constant.
///
/// Unlike plain JSON there is a distinction between integers, floats and
/// decimals, so that constants keep the numeric type their property declares.
///
/// # Examples
///
/// ```
/// use docql::Value;
/// use std::collections::HashMap;
///
/// let name = Value::String("Rex".to_string());
/// let age = Value::Integer(4);
///
/// let mut obj = HashMap::new();
/// obj.insert("Name".to_string(), name);
/// obj.insert("Age".to_string(), age);
/// let document = Value::Object(obj);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// Exact decimal number
    Decimal(Decimal),

    /// UTF-8 string
    String(String),

    /// Array of values
    Array(Vec<Value>),

    /// Object with string keys
    Object(HashMap<String, Value>),
}

/// Declared type of a property, used to type constants in predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Integer,
    Float,
    Decimal,
    Boolean,
    /// Embedded document; its fields are declared on the owning property.
    Object,
    /// Opaque array; paths never step into it.
    Array,
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Decimal => "decimal",
            ValueType::Boolean => "boolean",
            ValueType::Object => "object",
            ValueType::Array => "array",
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// Whether the value satisfies a filter condition.
    ///
    /// Only `true` does; any other value, `null` included, is not a match.
    pub fn as_bool(&self) -> bool {
        matches!(self, Value::Boolean(true))
    }

    /// Get any numeric value as an exact decimal
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Integer(n) => Decimal::from_i64(*n),
            Value::Float(n) => Decimal::from_f64(*n),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Human-readable name of the value's type
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// The declared type a constant of this value gets when none is given.
    ///
    /// `Null` has no natural type and returns `None`.
    pub fn natural_type(&self) -> Option<ValueType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(ValueType::Boolean),
            Value::Integer(_) => Some(ValueType::Integer),
            Value::Float(_) => Some(ValueType::Float),
            Value::Decimal(_) => Some(ValueType::Decimal),
            Value::String(_) => Some(ValueType::String),
            Value::Array(_) => Some(ValueType::Array),
            Value::Object(_) => Some(ValueType::Object),
        }
    }

    /// Whether this value may be stored in a property declared as `ty`.
    ///
    /// Integers widen into float and decimal properties.
    pub fn conforms_to(&self, ty: ValueType) -> bool {
        matches!(
            (self, ty),
            (Value::String(_), ValueType::String)
                | (Value::Integer(_), ValueType::Integer)
                | (Value::Integer(_), ValueType::Float)
                | (Value::Integer(_), ValueType::Decimal)
                | (Value::Float(_), ValueType::Float)
                | (Value::Decimal(_), ValueType::Decimal)
                | (Value::Boolean(_), ValueType::Boolean)
                | (Value::Object(_), ValueType::Object)
                | (Value::Array(_), ValueType::Array)
        )
    }

    /// Convert an integer into the float or decimal representation of `ty`.
    ///
    /// Any other value is returned unchanged.
    pub fn widen_to(self, ty: ValueType) -> Value {
        match (self, ty) {
            (Value::Integer(n), ValueType::Float) => Value::Float(n as f64),
            (Value::Integer(n), ValueType::Decimal) => Value::Decimal(Decimal::from(n)),
            (value, _) => value,
        }
    }

    /// Get a field of an object value
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(name),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

/// Convert serde_json::Value to a document Value
pub fn from_json(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                n.as_f64().map(Value::Float).unwrap_or(Value::Null)
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(from_json).collect()),
        serde_json::Value::Object(obj) => {
            Value::Object(obj.into_iter().map(|(k, v)| (k, from_json(v))).collect())
        }
    }
}
