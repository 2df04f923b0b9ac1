use std::time::Instant;

use mapq_core::domain::{PipelineOutput, ValidationReport};
use mapq_core::error::AppError;
use mapq_core::validate::validate_and_correct;
use serde_json::Value;
use sha2::{Digest, Sha256};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::guardrails::parse_intent_json;
use crate::llm::Llm;
use crate::prompts;

/// Two-step query pipeline: refine the analyst's wording, then extract structured intent.
pub struct QueryPipeline<'a> {
    llm: &'a dyn Llm,
    model: String,
}

impl<'a> QueryPipeline<'a> {
    pub fn new(llm: &'a dyn Llm, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    pub fn refine_query(&self, query: &str) -> Result<String, AppError> {
        let out = self
            .llm
            .chat(&self.model, &prompts::query_refinement_prompt(), query)?;
        let refined = out.trim();
        if refined.is_empty() {
            return Err(AppError::new("AI_REFINE_EMPTY", "Query refinement returned nothing"));
        }
        Ok(refined.to_string())
    }

    pub fn extract_intent(&self, refined_query: &str) -> Result<Value, AppError> {
        let raw = self.llm.chat(
            &self.model,
            &prompts::intent_recognition_prompt(),
            refined_query,
        )?;
        parse_intent_json(&raw)
    }

    /// Run both steps. Failures are recorded in `error` rather than returned, and the first
    /// failure stops the run. Fields that were never reached stay `null`.
    pub fn run(&self, query: &str) -> PipelineOutput {
        let fingerprint = query_fingerprint(query);
        let started = Instant::now();

        let mut out = PipelineOutput::for_query(query);
        if let Ok(ts) = OffsetDateTime::now_utc().format(&Rfc3339) {
            out.insert("started_at", Value::String(ts));
        }
        out.insert("query_sha256", Value::String(fingerprint.clone()));

        match self.refine_query(query) {
            Ok(refined) => {
                tracing::info!(query_sha256 = %fingerprint, "query refined");
                match self.extract_intent(&refined) {
                    Ok(intent) => {
                        tracing::info!(query_sha256 = %fingerprint, "intent extracted");
                        out.set_structured_intent(intent);
                    }
                    Err(e) => {
                        tracing::warn!(query_sha256 = %fingerprint, code = %e.code, "intent extraction failed");
                        out.set_error(e.to_string());
                    }
                }
                out.set_refined_query(refined);
            }
            Err(e) => {
                tracing::warn!(query_sha256 = %fingerprint, code = %e.code, "query refinement failed");
                out.set_error(e.to_string());
            }
        }

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        out.insert("elapsed_ms", Value::from(elapsed_ms));
        out
    }

    pub fn run_and_validate(&self, query: &str) -> (PipelineOutput, ValidationReport) {
        let out = self.run(query);
        let report = validate_and_correct(&out);
        tracing::info!(
            query_sha256 = out.get("query_sha256").and_then(serde_json::Value::as_str).unwrap_or_default(),
            is_valid = report.is_valid,
            issues = report.issues.len(),
            "pipeline output validated"
        );
        (out, report)
    }
}

/// Hex SHA-256 of the query text; logged instead of the query itself.
pub fn query_fingerprint(query: &str) -> String {
    hex::encode(Sha256::digest(query.as_bytes()))
}
