use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Scalar value recovered from a survey transcript. No nesting; anything
/// structured that survives parsing is rendered to text.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Lowercase field names mapped to recovered scalars. Keys outside the
/// survey schema are retained here and ignored by the validator.
pub type FieldMap = BTreeMap<String, FieldValue>;

impl FieldValue {
    pub fn as_json(&self) -> Value {
        match self {
            FieldValue::Bool(value) => Value::Bool(*value),
            FieldValue::Number(value) => Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Text(value) => Value::String(value.clone()),
        }
    }

    pub(crate) fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(flag) => Some(FieldValue::Bool(*flag)),
            Value::Number(number) => number.as_f64().map(FieldValue::Number),
            Value::String(text) => Some(FieldValue::Text(text.clone())),
            other => Some(FieldValue::Text(other.to_string())),
        }
    }
}

/// Canonical JSON rendering of a field map; re-parsing this through the
/// lenient parser recovers the same map.
pub fn to_canonical_json(fields: &FieldMap) -> Value {
    let entries: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| (key.clone(), value.as_json()))
        .collect();
    Value::Object(entries)
}
