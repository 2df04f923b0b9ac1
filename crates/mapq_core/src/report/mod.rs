use std::collections::BTreeSet;

use serde_json::Value;

use crate::domain::{Entities, PipelineOutput, ValidationReport};
use crate::normalize::normalize;

const ABSENT: &str = "(absent)";

fn cell(value: Option<&Value>) -> String {
    match value {
        None => ABSENT.to_string(),
        Some(v) => format!("`{}`", v.to_string().replace('|', "\\|")),
    }
}

fn input_entities(input: &PipelineOutput) -> Entities {
    let structured = normalize(input.structured_intent());
    normalize(structured.get("entities"))
}

/// Render a validation report for an operator: verdict, issues, then the extracted entities
/// next to the corrected ones so the correction can be accepted or overridden.
///
/// Output is deterministic (fields in key order, issues in rule order) so it can be
/// snapshot-tested.
pub fn render_validation_markdown(input: &PipelineOutput, report: &ValidationReport) -> String {
    let mut out = String::new();
    out.push_str("# Query intent validation\n\n");

    if let Some(q) = input.original_query() {
        out.push_str(&format!("- Original query: {q}\n"));
    }
    if let Some(q) = input.refined_query() {
        out.push_str(&format!("- Refined query: {q}\n"));
    }
    if let Some(e) = input.error_text() {
        out.push_str(&format!("- Pipeline error: {e}\n"));
    }
    let verdict = if report.is_valid {
        "**valid**"
    } else {
        "**needs review**"
    };
    out.push_str(&format!("- Verdict: {verdict}\n\n"));

    out.push_str("## Issues\n\n");
    if report.issues.is_empty() {
        out.push_str("None.\n\n");
    } else {
        out.push_str("| Severity | Code | Message |\n");
        out.push_str("|---|---|---|\n");
        for issue in &report.issues {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                issue.severity,
                issue.code,
                issue.message.replace('|', "\\|")
            ));
        }
        out.push('\n');
    }

    out.push_str("## Entities\n\n");
    let before = input_entities(input);
    let after = &report.suggested_fixes.entities;
    let fields: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    if fields.is_empty() {
        out.push_str("No entities extracted.\n");
        return out;
    }
    out.push_str("| Field | Extracted | Corrected |\n");
    out.push_str("|---|---|---|\n");
    for field in fields {
        let was = before.get(field.as_str());
        let now = after.get(field.as_str());
        let marker = if was == now { "" } else { " *" };
        out.push_str(&format!(
            "| {field}{marker} | {} | {} |\n",
            cell(was),
            cell(now)
        ));
    }
    out.push_str("\nFields marked * were changed by the automatic correction.\n");
    out
}
