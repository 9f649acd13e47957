//! The argument bag and value coercion.

use serde_json::{Map, Number, Value};

use super::descriptor::ParamType;
use super::error::ArgumentError;

/// Untyped per-invocation input: parameter name to arbitrary JSON value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentBag(Map<String, Value>);

impl ArgumentBag {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Value supplied for `name`. A JSON `null` counts as not supplied.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Value> for ArgumentBag {
    type Error = ArgumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            // The protocol layer sends a missing argument list as null.
            Value::Null => Ok(Self::default()),
            other => Err(ArgumentError::NotAnObject(kind_of(&other))),
        }
    }
}

impl From<Map<String, Value>> for ArgumentBag {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Human-readable JSON kind, used in error messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Coerce a supplied value to a parameter's declared type hint.
///
/// Loose caller input (numbers as strings, booleans as strings) is converted;
/// anything else that does not fit is a [`ArgumentError::TypeMismatch`].
pub fn coerce(name: &str, param_type: ParamType, value: &Value) -> Result<Value, ArgumentError> {
    let mismatch = || ArgumentError::TypeMismatch {
        name: name.to_string(),
        expected: param_type.json_schema_type(),
        found: kind_of(value),
    };

    match (param_type, value) {
        (ParamType::String, Value::String(_)) => Ok(value.clone()),
        (ParamType::String, Value::Number(_) | Value::Bool(_)) => {
            Ok(Value::String(value.to_string()))
        }
        // Lists of scalars become comma-separated text (`types=spaces,snippets`);
        // structured fields (blocks, attachments) become JSON text.
        (ParamType::String, Value::Array(_) | Value::Object(_)) => {
            Ok(Value::String(wire_text(value)))
        }

        (ParamType::Number, Value::Number(_)) => Ok(value.clone()),
        (ParamType::Number, Value::String(s)) => {
            let s = s.trim();
            // Integral text stays integral so "20" is sent as 20, not 20.0.
            s.parse::<i64>()
                .map(Number::from)
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(Number::from_f64))
                .map(Value::Number)
                .ok_or_else(mismatch)
        }

        (ParamType::Integer, Value::Number(n)) => {
            if n.is_i64() || n.is_u64() {
                Ok(value.clone())
            } else {
                n.as_f64()
                    .filter(|f| {
                        f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64
                    })
                    .map(|f| Value::Number(Number::from(f as i64)))
                    .ok_or_else(mismatch)
            }
        }
        (ParamType::Integer, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(|i| Value::Number(Number::from(i)))
            .map_err(|_| mismatch()),

        (ParamType::Boolean, Value::Bool(_)) => Ok(value.clone()),
        (ParamType::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(mismatch()),
        },

        (ParamType::Array, Value::Array(_)) => Ok(value.clone()),
        (ParamType::Object, Value::Object(_)) => Ok(value.clone()),

        _ => Err(mismatch()),
    }
}

/// Render a value as query-string or header text.
pub fn wire_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) if items.iter().all(is_scalar) => items
            .iter()
            .map(wire_text)
            .collect::<Vec<_>>()
            .join(","),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}
