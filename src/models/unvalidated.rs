//! Defensive coercion of LLM-produced fields.
//!
//! Every structured field of a slide may arrive as the expected JSON shape, as a
//! JSON document serialized into a string (sometimes twice), or as something
//! else entirely. [`Unvalidated`] classifies the raw value and
//! [`Unvalidated::normalize_or`] turns it into the expected shape or a default.
//! Nothing in this module returns an error.

use serde_json::{Map, Value};

/// A JSON shape a field is expected to have.
pub trait Shape: Sized {
    /// Human readable name used in log messages.
    const NAME: &'static str;

    /// Extracts the shape from an owned value, returning `None` on mismatch.
    fn from_value(value: Value) -> Option<Self>;

    /// Borrowing variant of [`Shape::from_value`].
    fn from_ref(value: &Value) -> Option<Self>;
}

impl Shape for Map<String, Value> {
    const NAME: &'static str = "mapping";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    fn from_ref(value: &Value) -> Option<Self> {
        value.as_object().cloned()
    }
}

impl Shape for Vec<Value> {
    const NAME: &'static str = "sequence";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    fn from_ref(value: &Value) -> Option<Self> {
        value.as_array().cloned()
    }
}

/// A field read from untrusted input, tagged by what it turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Unvalidated<T> {
    /// The field already has the expected shape.
    Valid(T),
    /// The field is a string that may contain the expected shape as JSON.
    Encoded(String),
    /// The field is present but has an unrelated type.
    Invalid(Value),
    /// The field is absent or null.
    Missing,
}

impl<T: Shape> Unvalidated<T> {
    /// Classifies a raw (possibly absent) value.
    pub fn classify(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Unvalidated::Missing,
            Some(Value::String(text)) => Unvalidated::Encoded(text.clone()),
            Some(other) => match T::from_ref(other) {
                Some(valid) => Unvalidated::Valid(valid),
                None => Unvalidated::Invalid(other.clone()),
            },
        }
    }

    /// Resolves the field to the expected shape, falling back to `default`.
    ///
    /// `field` only feeds the log line emitted when a recovery fails.
    pub fn normalize_or(self, field: &str, default: T) -> T {
        match self {
            Unvalidated::Valid(value) => value,
            Unvalidated::Missing => default,
            Unvalidated::Invalid(value) => {
                log::warn!(
                    "Field '{}' expected a {} but got {}, using default",
                    field,
                    T::NAME,
                    type_name(&value)
                );
                default
            }
            Unvalidated::Encoded(text) => match parse_json_leniently(&text) {
                Some(parsed) => match T::from_value(parsed) {
                    Some(value) => value,
                    None => {
                        log::warn!(
                            "Field '{}' parsed from a string but is not a {}, using default",
                            field,
                            T::NAME
                        );
                        default
                    }
                },
                None => {
                    if !text.trim().is_empty() {
                        log::warn!(
                            "Field '{}' is a string but not valid JSON, using default. Value: {}",
                            field,
                            preview(&text)
                        );
                    }
                    default
                }
            },
        }
    }
}

/// Reads `value` as a mapping, or returns an empty mapping.
pub fn ensure_mapping(value: Option<&Value>, field: &str) -> Map<String, Value> {
    Unvalidated::<Map<String, Value>>::classify(value).normalize_or(field, Map::new())
}

/// Reads `value` as a sequence, or returns an empty sequence.
pub fn ensure_sequence(value: Option<&Value>, field: &str) -> Vec<Value> {
    Unvalidated::<Vec<Value>>::classify(value).normalize_or(field, Vec::new())
}

/// Parses a string produced by an LLM into JSON.
///
/// Strategies, in order: a plain parse (after removing Markdown code fences),
/// an unescape-then-reparse for doubly encoded documents, and a targeted
/// replacement of `\"`, `\n` and `\t` escapes.
pub fn parse_json_leniently(text: &str) -> Option<Value> {
    let cleaned = strip_code_fences(text);
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        return match value {
            // A JSON string literal holding another document.
            Value::String(inner) => serde_json::from_str::<Value>(inner.trim()).ok(),
            other => Some(other),
        };
    }

    // Escaped document without its surrounding quotes, e.g. {\"a\": 1}
    let quoted = format!("\"{}\"", cleaned);
    if let Ok(Value::String(unescaped)) = serde_json::from_str::<Value>(&quoted) {
        if let Ok(value) = serde_json::from_str::<Value>(unescaped.trim()) {
            return Some(value);
        }
    }

    let replaced = cleaned
        .replace("\\\"", "\"")
        .replace("\\n", "\n")
        .replace("\\t", "\t");
    serde_json::from_str::<Value>(replaced.trim()).ok()
}

fn strip_code_fences(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest.trim_start();
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest.trim_start();
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest.trim_end();
    }
    cleaned
}

/// Short name of a JSON value's type for log messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

fn preview(text: &str) -> String {
    text.chars().take(100).collect()
}
