use std::cell::RefCell;
use std::collections::VecDeque;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use mapq_ai::llm::Llm;
use mapq_ai::pipeline::{query_fingerprint, QueryPipeline};
use mapq_core::domain::IssueCode;
use mapq_core::error::AppError;

/// Replays scripted completions in order and records the user messages it received.
struct ScriptedLlm {
    replies: RefCell<VecDeque<Result<String, AppError>>>,
    seen: RefCell<Vec<String>>,
}

impl ScriptedLlm {
    fn new(replies: Vec<Result<String, AppError>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            seen: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.seen.borrow().clone()
    }
}

impl Llm for ScriptedLlm {
    fn chat(&self, _model: &str, _system: &str, user: &str) -> Result<String, AppError> {
        self.seen.borrow_mut().push(user.to_string());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::new("TEST_EXHAUSTED", "no scripted reply left")))
    }
}

const QUERY: &str = "我想知道铜陵镇涉毒场所的分布位置，在地图上显示";
const REFINED: &str = "制作一张漳州市铜陵镇涉毒场所的散点图";

#[test]
fn runs_refine_then_extract() {
    let llm = ScriptedLlm::new(vec![
        Ok(format!("  {REFINED}\n")),
        Ok(r#"```json
{"intent": "spatial_analysis", "entities": {"theme": ["禁毒"], "maptype": "散点图", "location": ["漳州市铜陵镇"], "poi": ["涉毒场所"]}}
```"#
            .to_string()),
    ]);
    let pipeline = QueryPipeline::new(&llm, "mock");
    let out = pipeline.run(QUERY);

    assert_eq!(llm.calls(), vec![QUERY.to_string(), REFINED.to_string()]);
    assert_eq!(out.original_query(), Some(QUERY));
    assert_eq!(out.refined_query(), Some(REFINED));
    assert_eq!(out.error(), Some(&Value::Null));
    assert_eq!(
        out.structured_intent().and_then(|v| v.get("intent")),
        Some(&json!("spatial_analysis"))
    );
    assert_eq!(
        out.get("query_sha256"),
        Some(&json!(query_fingerprint(QUERY)))
    );
    assert!(out.get("elapsed_ms").is_some_and(|v| v.is_u64()));
    assert!(out.get("started_at").is_some());
}

#[test]
fn refinement_failure_stops_the_run() {
    let llm = ScriptedLlm::new(vec![Err(AppError::new("AI_LLM_FAILED", "boom")
        .with_retryable(true))]);
    let pipeline = QueryPipeline::new(&llm, "mock");
    let (out, report) = pipeline.run_and_validate(QUERY);

    assert_eq!(llm.calls().len(), 1);
    assert_eq!(out.error(), Some(&json!("[AI_LLM_FAILED] boom")));
    // Steps that never ran are still present, as null.
    assert_eq!(out.get("refined_query"), Some(&Value::Null));
    assert_eq!(out.structured_intent(), Some(&Value::Null));
    assert_eq!(report.issue_codes(), vec![IssueCode::NoEntities]);
    assert!(!report.is_valid);
}

#[test]
fn blank_refinement_is_an_error() {
    let llm = ScriptedLlm::new(vec![Ok("   ".to_string())]);
    let pipeline = QueryPipeline::new(&llm, "mock");
    assert_eq!(pipeline.refine_query(QUERY).unwrap_err().code, "AI_REFINE_EMPTY");
}

#[test]
fn extraction_failure_keeps_refined_query() {
    let llm = ScriptedLlm::new(vec![
        Ok(REFINED.to_string()),
        Ok("抱歉，我无法处理".to_string()),
    ]);
    let pipeline = QueryPipeline::new(&llm, "mock");
    let out = pipeline.run(QUERY);

    assert_eq!(out.refined_query(), Some(REFINED));
    assert_eq!(out.structured_intent(), Some(&Value::Null));
    assert!(out
        .error_text()
        .is_some_and(|e| e.starts_with("[AI_INTENT_INVALID_JSON]")));
}

#[test]
fn model_reported_error_is_surfaced() {
    let llm = ScriptedLlm::new(vec![
        Ok(REFINED.to_string()),
        Ok(r#"{"error": "query is not about maps"}"#.to_string()),
    ]);
    let pipeline = QueryPipeline::new(&llm, "mock");
    let err = pipeline.extract_intent(REFINED).unwrap_err();
    assert_eq!(err.code, "AI_INTENT_MODEL_ERROR");
}

#[test]
fn run_and_validate_repairs_extracted_entities() {
    let llm = ScriptedLlm::new(vec![
        Ok(REFINED.to_string()),
        Ok(r#"{"intent": "spatial_analysis", "entities": {"theme": ["禁毒", "涉毒"], "location": "漳州市铜陵镇", "poi": ["涉毒场所点位"]}}"#.to_string()),
    ]);
    let pipeline = QueryPipeline::new(&llm, "mock");
    let (out, report) = pipeline.run_and_validate(QUERY);

    assert_eq!(
        report.issue_codes(),
        vec![IssueCode::InvalidTheme, IssueCode::InferredMaptype]
    );
    assert!(!report.is_valid);
    assert_eq!(
        report.suggested_fixes.entities.get("maptype"),
        Some(&json!(["热力图"]))
    );
    let mut untouched = report.corrected_output.clone().into_map();
    let mut expected = out.clone().into_map();
    untouched.remove("structured_intent");
    expected.remove("structured_intent");
    assert_eq!(untouched, expected);
}
