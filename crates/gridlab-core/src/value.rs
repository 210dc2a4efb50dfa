//! Tagged value model shared by specifications and experiment results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, LabError};

/// A single parameter or result value.
///
/// The untagged representation keeps interchange files plain JSON: a
/// specification serializes as an ordinary object, not as tagged variants.
/// Variant order matters for deserialization: integers must be tried before
/// floats so `1` parses as [`Value::Int`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent value.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Signed integer scalar.
    Int(i64),
    /// Floating point scalar. May be non-finite, which JSON cannot
    /// represent; see [`Value::is_json_representable`].
    Float(f64),
    /// Text scalar.
    Text(String),
    /// Ordered sequence of values.
    List(Vec<Value>),
    /// Nested mapping with order-independent equality.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns true when the value survives a JSON round-trip unchanged.
    ///
    /// Non-finite floats are the only offenders: `serde_json` would quietly
    /// collapse them to `null`, so persistence dispatches such payloads to
    /// the binary format instead.
    pub fn is_json_representable(&self) -> bool {
        match self {
            Value::Float(f) => f.is_finite(),
            Value::List(values) => values.iter().all(Value::is_json_representable),
            Value::Map(map) => map.values().all(Value::is_json_representable),
            _ => true,
        }
    }

    /// Converts the value into a `serde_json::Value`.
    ///
    /// Fails with a serde-family error when the value holds a non-finite
    /// float; callers that need lossless storage use the binary codec.
    pub fn to_json(&self) -> Result<serde_json::Value, LabError> {
        match self {
            Value::Null => Ok(serde_json::Value::Null),
            Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
            Value::Int(i) => Ok(serde_json::Value::Number((*i).into())),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| {
                    LabError::Serde(
                        ErrorInfo::new("non-finite-float", "JSON cannot represent this float")
                            .with_context("value", f.to_string()),
                    )
                }),
            Value::Text(s) => Ok(serde_json::Value::String(s.clone())),
            Value::List(values) => {
                let mut out = Vec::with_capacity(values.len());
                for value in values {
                    out.push(value.to_json()?);
                }
                Ok(serde_json::Value::Array(out))
            }
            Value::Map(map) => {
                let mut out = serde_json::Map::new();
                for (key, value) in map {
                    out.insert(key.clone(), value.to_json()?);
                }
                Ok(serde_json::Value::Object(out))
            }
        }
    }

    /// Converts a `serde_json::Value` into the engine's value model.
    ///
    /// Total: every JSON document maps to exactly one [`Value`]. Unsigned
    /// integers beyond `i64` fall back to the float representation.
    pub fn from_json(value: serde_json::Value) -> Value {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(values) => {
                Value::List(values.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from_json(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// Converts a value mapping into a JSON object, failing on non-finite floats.
pub(crate) fn map_to_json(map: &BTreeMap<String, Value>) -> Result<serde_json::Value, LabError> {
    let mut out = serde_json::Map::new();
    for (key, value) in map {
        out.insert(key.clone(), value.to_json()?);
    }
    Ok(serde_json::Value::Object(out))
}

/// Externally tagged mirror of [`Value`] for non-self-describing formats.
///
/// The public enum is untagged for the sake of plain JSON files, but
/// untagged enums cannot deserialize from bincode. The mirror carries
/// explicit variant tags so binary round-trips stay total, including
/// non-finite floats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum TaggedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<TaggedValue>),
    Map(BTreeMap<String, TaggedValue>),
}

impl From<&Value> for TaggedValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => TaggedValue::Null,
            Value::Bool(b) => TaggedValue::Bool(*b),
            Value::Int(i) => TaggedValue::Int(*i),
            Value::Float(f) => TaggedValue::Float(*f),
            Value::Text(s) => TaggedValue::Text(s.clone()),
            Value::List(values) => TaggedValue::List(values.iter().map(Into::into).collect()),
            Value::Map(map) => TaggedValue::Map(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.into()))
                    .collect(),
            ),
        }
    }
}

impl From<TaggedValue> for Value {
    fn from(value: TaggedValue) -> Self {
        match value {
            TaggedValue::Null => Value::Null,
            TaggedValue::Bool(b) => Value::Bool(b),
            TaggedValue::Int(i) => Value::Int(i),
            TaggedValue::Float(f) => Value::Float(f),
            TaggedValue::Text(s) => Value::Text(s),
            TaggedValue::List(values) => Value::List(values.into_iter().map(Into::into).collect()),
            TaggedValue::Map(map) => Value::Map(
                map.into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }
}
