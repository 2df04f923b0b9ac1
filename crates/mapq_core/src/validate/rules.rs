use serde_json::Value;

use crate::domain::{Entities, Issue, IssueCode};
use crate::infer::infer_maptype;
use crate::normalize::{is_truthy, FieldValue};
use crate::vocab::{is_allowed_maptype, is_allowed_theme};

/// Result of one rule pass over a set of entities.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub issues: Vec<Issue>,
    pub corrected: Entities,
    pub is_valid: bool,
}

/// Apply the business rules in order: presence, theme whitelist, map type whitelist or
/// inference, then spatial/subject sufficiency.
///
/// The input is never modified; `corrected` is a fresh copy with repairs applied.
pub fn validate_entities(entities: &Entities) -> RuleOutcome {
    let mut issues = Vec::new();

    if entities.is_empty() {
        issues.push(Issue::new(
            IssueCode::NoEntities,
            "No entities found, or the structured intent could not be parsed",
        ));
        return RuleOutcome {
            issues,
            corrected: entities.clone(),
            is_valid: false,
        };
    }

    let mut corrected = entities.clone();
    check_theme(&mut corrected, &mut issues);

    if check_maptype(&mut corrected, &mut issues) {
        // Runs against the theme-filtered entities, so rejected themes never drive inference.
        match infer_maptype(&corrected) {
            Some(mt) => {
                corrected.insert("maptype".to_string(), Value::from(vec![mt]));
                issues.push(Issue::new(
                    IssueCode::InferredMaptype,
                    format!("maptype missing or invalid; inferred {mt} from theme/poi"),
                ));
            }
            None => issues.push(Issue::new(
                IssueCode::MissingMaptype,
                "maptype is missing and could not be inferred from theme/poi",
            )),
        }
    }

    check_context(&corrected, &mut issues);

    let is_valid = !issues.iter().any(|i| i.code.invalidates());
    tracing::debug!(
        is_valid,
        issues = issues.len(),
        "entity rules evaluated"
    );

    RuleOutcome {
        issues,
        corrected,
        is_valid,
    }
}

fn check_theme(corrected: &mut Entities, issues: &mut Vec<Issue>) {
    let Some(theme) = corrected.get("theme").cloned() else {
        return;
    };

    // An empty theme carries nothing to check; drop it so the output never holds a bare scalar.
    if !is_truthy(&theme) {
        corrected.remove("theme");
        return;
    }

    match FieldValue::classify(&theme) {
        FieldValue::Text(t) if is_allowed_theme(t) => {
            corrected.insert("theme".to_string(), Value::from(vec![t]));
        }
        FieldValue::Text(t) => {
            issues.push(Issue::new(
                IssueCode::InvalidTheme,
                format!("theme is not an allowed value: {t}"),
            ));
            corrected.remove("theme");
        }
        FieldValue::List(items) => {
            let (kept, rejected): (Vec<&Value>, Vec<&Value>) = items
                .iter()
                .partition(|v| v.as_str().is_some_and(is_allowed_theme));
            if !rejected.is_empty() {
                issues.push(Issue::new(
                    IssueCode::InvalidTheme,
                    format!(
                        "theme contains values outside the allowed set: {}",
                        render_values(&rejected)
                    ),
                ));
            }
            if kept.is_empty() {
                corrected.remove("theme");
            } else {
                corrected.insert(
                    "theme".to_string(),
                    Value::Array(kept.into_iter().cloned().collect()),
                );
            }
        }
        FieldValue::Other(v) => {
            issues.push(Issue::new(
                IssueCode::InvalidTheme,
                format!("theme has an unsupported shape: {v}"),
            ));
            corrected.remove("theme");
        }
    }
}

/// Returns true when the map type has to be inferred.
fn check_maptype(corrected: &mut Entities, issues: &mut Vec<Issue>) -> bool {
    let Some(maptype) = corrected.get("maptype").cloned() else {
        return true;
    };

    match FieldValue::classify(&maptype) {
        FieldValue::List(items) => {
            let kept: Vec<Value> = items
                .iter()
                .filter(|v| v.as_str().is_some_and(is_allowed_maptype))
                .cloned()
                .collect();
            if kept.len() != items.len() {
                issues.push(Issue::new(
                    IssueCode::InvalidMaptype,
                    format!(
                        "maptype contains invalid values: {}; filtered to {}",
                        maptype,
                        Value::Array(kept.clone())
                    ),
                ));
            }
            if kept.is_empty() {
                corrected.remove("maptype");
                true
            } else {
                corrected.insert("maptype".to_string(), Value::Array(kept));
                false
            }
        }
        FieldValue::Text(mt) if is_allowed_maptype(mt) => {
            corrected.insert("maptype".to_string(), Value::from(vec![mt]));
            false
        }
        FieldValue::Text(mt) => {
            issues.push(Issue::new(
                IssueCode::InvalidMaptype,
                format!("maptype is not an allowed value: {mt}"),
            ));
            corrected.remove("maptype");
            true
        }
        FieldValue::Other(v) => {
            // No issue is recorded for this shape; inference decides the outcome.
            tracing::debug!(shape = %v, "dropping maptype of unexpected shape");
            corrected.remove("maptype");
            true
        }
    }
}

fn check_context(corrected: &Entities, issues: &mut Vec<Issue>) {
    if !corrected.contains_key("maptype") {
        return;
    }
    let present = |field: &str| corrected.get(field).is_some_and(is_truthy);
    if !present("location") && !present("poi") {
        issues.push(Issue::new(
            IssueCode::InsufficientContext,
            "maptype is set but neither location nor poi is provided",
        ));
    }
}

fn render_values(values: &[&Value]) -> String {
    Value::Array(values.iter().map(|v| (*v).clone()).collect()).to_string()
}
