//! Dynamic values of step keys

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Represents a value a step supplies for one of its keys
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Array(Vec<ParamValue>),
    Object(BTreeMap<String, ParamValue>),
    Null,
}

impl ParamValue {
    /// Attempts to get the value as a string
    pub fn as_string(&self) -> Option<&String> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get the value as an array
    pub fn as_array(&self) -> Option<&Vec<ParamValue>> {
        match self {
            ParamValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Attempts to get the value as an object
    pub fn as_object(&self) -> Option<&BTreeMap<String, ParamValue>> {
        match self {
            ParamValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Checks if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    /// Scalar rendered as text; numbers without a fractional part lose the `.0`
    pub fn to_text(&self) -> Option<String> {
        match self {
            ParamValue::String(s) => Some(s.clone()),
            ParamValue::Number(n) => Some(format_number(*n)),
            ParamValue::Boolean(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// A list of scalars, or a single scalar promoted to a one-element list
    pub fn to_text_list(&self) -> Option<Vec<String>> {
        match self {
            ParamValue::Array(items) => items.iter().map(ParamValue::to_text).collect(),
            scalar => scalar.to_text().map(|s| vec![s]),
        }
    }

    /// Numeric value, accepting numeric strings
    pub fn to_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            ParamValue::String(_) => "string",
            ParamValue::Number(_) => "number",
            ParamValue::Boolean(_) => "boolean",
            ParamValue::Array(_) => "list",
            ParamValue::Object(_) => "mapping",
            ParamValue::Null => "null",
        }
    }
}

/// Render a number the way a user would have written it
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&Value> for ParamValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => ParamValue::Null,
            Value::Bool(b) => ParamValue::Boolean(*b),
            Value::Number(n) => n.as_f64().map_or(ParamValue::Null, ParamValue::Number),
            Value::String(s) => ParamValue::String(s.clone()),
            Value::Sequence(items) => ParamValue::Array(items.iter().map(ParamValue::from).collect()),
            Value::Mapping(map) => ParamValue::Object(
                map.iter()
                    .filter_map(|(k, v)| {
                        ParamValue::from(k)
                            .to_text()
                            .map(|key| (key, ParamValue::from(v)))
                    })
                    .collect(),
            ),
            Value::Tagged(tagged) => ParamValue::from(&tagged.value),
        }
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::String(s)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Boolean(b)
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        ParamValue::Number(n)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(items: Vec<String>) -> Self {
        ParamValue::Array(items.into_iter().map(ParamValue::String).collect())
    }
}
