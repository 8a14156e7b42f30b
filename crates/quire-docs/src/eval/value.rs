use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Primitive value with a known kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TypedValue {
    String(String),
    Number(f64),
    Boolean(bool),
    /// Source text of the regex literal, delimiters and flags included.
    Regex(String),
}

impl TypedValue {
    /// Textual form used by string concatenation.
    pub fn text(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Boolean(b) => b.to_string(),
            Self::Regex(raw) => raw.clone(),
        }
    }

    /// Documentation type name of the value's kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "String",
            Self::Number(_) => "Number",
            Self::Boolean(_) => "Boolean",
            Self::Regex(_) => "RegExp",
        }
    }
}

/// Result of evaluating an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Typed(TypedValue),
    /// Literal whose runtime value has no supported kind (e.g. `null`).
    /// Carries the raw source text; there is no type classification.
    Unclassified(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    pub fn string(value: impl Into<String>) -> Self {
        Self::Typed(TypedValue::String(value.into()))
    }

    pub fn number(value: f64) -> Self {
        Self::Typed(TypedValue::Number(value))
    }

    pub fn boolean(value: bool) -> Self {
        Self::Typed(TypedValue::Boolean(value))
    }

    pub fn as_typed(&self) -> Option<&TypedValue> {
        match self {
            Self::Typed(typed) => Some(typed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Typed(TypedValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Documentation type name, `None` for unclassified literals.
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            Self::Typed(typed) => Some(typed.type_name()),
            Self::Unclassified(_) => None,
            Self::Array(_) => Some("Array"),
            Self::Object(_) => Some("Object"),
        }
    }

    /// Renders the value back as a source literal, e.g. for default values.
    pub fn to_literal(&self) -> String {
        match self {
            Self::Typed(TypedValue::String(s)) => format!("'{}'", s.replace('\'', "\\'")),
            Self::Typed(typed) => typed.text(),
            Self::Unclassified(raw) => raw.clone(),
            Self::Array(items) => {
                let items: Vec<String> = items.iter().map(Value::to_literal).collect();
                format!("[{}]", items.join(", "))
            }
            Self::Object(entries) => {
                let entries: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key, value.to_literal()))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Typed(typed) => f.write_str(&typed.text()),
            other => f.write_str(&other.to_literal()),
        }
    }
}

/// JavaScript-level type of an expression, as far as it can be told statically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeClass {
    Undefined,
    ThisRef,
    Boolean,
    String,
    Regexp,
    Other,
}

/// Formats a number the way JavaScript prints it for integral values
/// (`7` rather than `7.0`).
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{value:.0}")
    } else if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        value.to_string()
    }
}
