use serde::{Deserialize, Serialize};
use std::fmt;

/// Operational error shared by the core, the LLM pipeline and the CLI.
///
/// Business-rule findings never travel through this type; they are reported as
/// [`crate::domain::Issue`] entries inside a validation report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Bad or missing backend settings from the `MAPQ_*` environment. Raised before any
    /// model call is made, so it is never retryable.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new("CONFIG_INVALID", message)
    }

    /// Input text that does not parse as JSON at all, whether a pipeline payload or an
    /// entities argument. Well-formed JSON of the wrong kind is `PAYLOAD_INVALID_SHAPE`.
    ///
    /// Details carry the parser position so the operator can find the bad byte.
    pub fn invalid_payload(err: &serde_json::Error) -> Self {
        Self::new("PAYLOAD_INVALID_JSON", "Payload is not valid JSON")
            .with_details(format!("line={}; column={}; err={err}", err.line(), err.column()))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
