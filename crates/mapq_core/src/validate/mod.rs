use serde_json::Value;

use crate::domain::{PipelineOutput, SuggestedFixes, ValidationReport};
use crate::normalize::normalize;

pub mod rules;

pub use rules::{validate_entities, RuleOutcome};

/// Validate the entities carried by a pipeline payload and produce a corrected copy.
///
/// The caller's payload is never modified. `corrected_output` is a deep copy in which only
/// `structured_intent.entities` may differ (key spelling, explicit nulls and side fields are
/// kept); when no entities can be found it is returned exactly as received.
pub fn validate_and_correct(output: &PipelineOutput) -> ValidationReport {
    let mut corrected_output = output.clone();

    let structured = normalize(output.structured_intent());
    let entities = normalize(structured.get("entities"));

    let outcome = validate_entities(&entities);
    let codes: Vec<&str> = outcome.issues.iter().map(|i| i.code.as_str()).collect();
    tracing::debug!(is_valid = outcome.is_valid, ?codes, "validated structured intent");

    if entities.is_empty() {
        return ValidationReport {
            is_valid: outcome.is_valid,
            issues: outcome.issues,
            corrected_output,
            suggested_fixes: SuggestedFixes {
                entities: outcome.corrected,
            },
        };
    }

    // A text intent becomes an object in the corrected copy; it keeps its key spelling.
    let mut corrected_structured = structured;
    corrected_structured.insert(
        "entities".to_string(),
        Value::Object(outcome.corrected.clone()),
    );
    corrected_output.set_structured_intent(Value::Object(corrected_structured));

    ValidationReport {
        is_valid: outcome.is_valid,
        issues: outcome.issues,
        corrected_output,
        suggested_fixes: SuggestedFixes {
            entities: outcome.corrected,
        },
    }
}
