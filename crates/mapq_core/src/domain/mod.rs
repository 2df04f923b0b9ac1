use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Extracted entity fields, keyed by field name (`theme`, `maptype`, `location`, `poi`, ...).
///
/// Values are loosely typed: a single string or an ordered list of strings is expected, but
/// anything the extractor produced is carried so unrecognized fields pass through untouched.
pub type Entities = Map<String, Value>;

pub const ORIGINAL_QUERY_KEYS: [&str; 2] = ["original_query", "originalQuery"];
pub const REFINED_QUERY_KEYS: [&str; 2] = ["refined_query", "refinedQuery"];
pub const STRUCTURED_INTENT_KEYS: [&str; 2] = ["structured_intent", "structuredIntent"];
pub const ERROR_KEYS: [&str; 1] = ["error"];

/// Payload produced by the refine + extract pipeline and consumed by the validator.
///
/// Notes:
/// - The JSON object is kept exactly as received: key spelling (snake_case or camelCase),
///   explicit `null`s and values of any shape all survive a load/store round trip.
/// - `structured_intent` may be an object or the JSON text of one; it is resolved only at the
///   normalizer boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PipelineOutput(Map<String, Value>);

impl PipelineOutput {
    /// Parse a pipeline payload. Malformed JSON and JSON that is not an object are reported
    /// with distinct codes.
    pub fn from_json_str(text: &str) -> Result<Self, crate::error::AppError> {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(other) => Err(crate::error::AppError::new(
                "PAYLOAD_INVALID_SHAPE",
                "Pipeline output must be a JSON object",
            )
            .with_details(format!("found={}", json_kind(&other)))),
            Err(e) => Err(crate::error::AppError::invalid_payload(&e)),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Payload for one query, with the pipeline fields present as `null` until filled in.
    pub fn for_query(original_query: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert(
            ORIGINAL_QUERY_KEYS[0].to_string(),
            Value::String(original_query.into()),
        );
        map.insert(REFINED_QUERY_KEYS[0].to_string(), Value::Null);
        map.insert(STRUCTURED_INTENT_KEYS[0].to_string(), Value::Null);
        map.insert(ERROR_KEYS[0].to_string(), Value::Null);
        Self(map)
    }

    /// Convenience constructor for a payload whose intent is already an object.
    pub fn with_entities(original_query: impl Into<String>, entities: Entities) -> Self {
        let mut intent = Map::new();
        intent.insert("entities".to_string(), Value::Object(entities));
        let mut out = Self::default();
        out.set_original_query(original_query);
        out.set_structured_intent(Value::Object(intent));
        out
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set an auxiliary field (timing, fingerprints, ...).
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// First present spelling of a field, with its key.
    fn lookup(&self, keys: &[&str]) -> Option<(&str, &Value)> {
        keys.iter()
            .find_map(|k| self.0.get_key_value(*k))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Write a field under the spelling it already has, or the snake_case one.
    fn store(&mut self, keys: &[&str], value: Value) {
        let key = self
            .lookup(keys)
            .map(|(k, _)| k.to_string())
            .unwrap_or_else(|| keys[0].to_string());
        self.0.insert(key, value);
    }

    pub fn original_query(&self) -> Option<&str> {
        self.lookup(&ORIGINAL_QUERY_KEYS)?.1.as_str()
    }

    pub fn refined_query(&self) -> Option<&str> {
        self.lookup(&REFINED_QUERY_KEYS)?.1.as_str()
    }

    /// Raw intent value, `null` included.
    pub fn structured_intent(&self) -> Option<&Value> {
        Some(self.lookup(&STRUCTURED_INTENT_KEYS)?.1)
    }

    /// Prior pipeline error, of whatever shape it was recorded with.
    pub fn error(&self) -> Option<&Value> {
        Some(self.lookup(&ERROR_KEYS)?.1)
    }

    /// Prior pipeline error as display text; `None` when absent or `null`.
    pub fn error_text(&self) -> Option<String> {
        match self.error()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn set_original_query(&mut self, query: impl Into<String>) {
        self.store(&ORIGINAL_QUERY_KEYS, Value::String(query.into()));
    }

    pub fn set_refined_query(&mut self, query: impl Into<String>) {
        self.store(&REFINED_QUERY_KEYS, Value::String(query.into()));
    }

    pub fn set_structured_intent(&mut self, intent: Value) {
        self.store(&STRUCTURED_INTENT_KEYS, intent);
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.store(&ERROR_KEYS, Value::String(error.into()));
    }

    /// Entities as currently stored in `structured_intent`, if it is an object carrying an
    /// `entities` object. Text payloads are not parsed here.
    pub fn entities(&self) -> Option<&Entities> {
        self.structured_intent()?
            .as_object()?
            .get("entities")?
            .as_object()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed taxonomy of validator findings. Severity is a property of the code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    NoEntities,
    InvalidTheme,
    InvalidMaptype,
    InferredMaptype,
    MissingMaptype,
    InsufficientContext,
}

impl IssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCode::NoEntities => "NO_ENTITIES",
            IssueCode::InvalidTheme => "INVALID_THEME",
            IssueCode::InvalidMaptype => "INVALID_MAPTYPE",
            IssueCode::InferredMaptype => "INFERRED_MAPTYPE",
            IssueCode::MissingMaptype => "MISSING_MAPTYPE",
            IssueCode::InsufficientContext => "INSUFFICIENT_CONTEXT",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            IssueCode::NoEntities => Severity::Error,
            IssueCode::InferredMaptype => Severity::Info,
            IssueCode::InvalidTheme
            | IssueCode::InvalidMaptype
            | IssueCode::MissingMaptype
            | IssueCode::InsufficientContext => Severity::Warning,
        }
    }

    /// Whether recording this code marks the report as needing review.
    ///
    /// `INVALID_MAPTYPE` is a warning that does not invalidate: the bad values are filtered and
    /// the field is re-derived, so the outcome is already usable.
    pub fn invalidates(self) -> bool {
        match self {
            IssueCode::NoEntities
            | IssueCode::InvalidTheme
            | IssueCode::MissingMaptype
            | IssueCode::InsufficientContext => true,
            IssueCode::InvalidMaptype | IssueCode::InferredMaptype => false,
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    pub code: IssueCode,
    pub message: String,
    pub severity: Severity,
}

impl Issue {
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            severity: code.severity(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SuggestedFixes {
    pub entities: Entities,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<Issue>,
    pub corrected_output: PipelineOutput,
    pub suggested_fixes: SuggestedFixes,
}

impl ValidationReport {
    pub fn has_issue(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    pub fn issue_codes(&self) -> Vec<IssueCode> {
        self.issues.iter().map(|i| i.code).collect()
    }
}
