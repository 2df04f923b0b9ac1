use serde_json::{Map, Value};

use crate::domain::Entities;

/// Shape of a loosely typed intent/entities payload, resolved once at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum IntentPayload<'a> {
    Parsed(&'a Map<String, Value>),
    RawText(&'a str),
    Missing,
}

impl<'a> IntentPayload<'a> {
    pub fn classify(value: Option<&'a Value>) -> Self {
        match value {
            Some(Value::Object(map)) => IntentPayload::Parsed(map),
            Some(Value::String(text)) => IntentPayload::RawText(text),
            _ => IntentPayload::Missing,
        }
    }

    /// Resolve into an owned mapping. Unparsable text, JSON text that is not an object and
    /// every other shape become an empty mapping.
    pub fn into_mapping(self) -> Map<String, Value> {
        match self {
            IntentPayload::Parsed(map) => map.clone(),
            IntentPayload::RawText(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => Map::new(),
            },
            IntentPayload::Missing => Map::new(),
        }
    }
}

/// Coerce an object or JSON-encoded text into a mapping; anything else yields an empty one.
///
/// Total by contract: malformed input degrades to "no entities" and the caller reports it.
pub fn normalize(value: Option<&Value>) -> Entities {
    let payload = IntentPayload::classify(value);
    if let IntentPayload::RawText(text) = &payload {
        tracing::debug!(bytes = text.len(), "parsing intent payload from text");
    }
    payload.into_mapping()
}

/// String-or-sequence view of an entity field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    List(&'a [Value]),
    Other(&'a Value),
}

impl<'a> FieldValue<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::String(s) => FieldValue::Text(s),
            Value::Array(items) => FieldValue::List(items),
            other => FieldValue::Other(other),
        }
    }
}

/// Python-style truthiness: null, false, zero, "" and empty containers are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Coerce a field value into an ordered list of strings.
///
/// A falsy value is an empty list, a scalar becomes a one-element list and non-string
/// members are rendered as JSON text.
pub fn string_items(value: &Value) -> Vec<String> {
    if !is_truthy(value) {
        return Vec::new();
    }
    match FieldValue::classify(value) {
        FieldValue::Text(s) => vec![s.to_string()],
        FieldValue::List(items) => items.iter().map(render_item).collect(),
        FieldValue::Other(v) => vec![render_item(v)],
    }
}

fn render_item(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
