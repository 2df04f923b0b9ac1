use std::io::Write;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use mapq_cli_lib::{load_pipeline_output, parse_entities, render_run, OutputFormat};
use mapq_core::validate::validate_and_correct;

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    f.write_all(contents.as_bytes()).expect("write");
    f
}

#[test]
fn validates_payload_from_file() {
    let f = write_temp(
        r#"{
  "original_query": "漳州市钟法路警务区内工厂的具体位置",
  "refined_query": "制作一张漳州市钟法路警务区内工厂的散点图",
  "structured_intent": "{\"entities\": {\"maptype\": \"散点图\", \"location\": [\"钟法路警务区\"], \"poi\": [\"工厂\"]}}",
  "elapsed_ms": 812
}"#,
    );
    let payload = load_pipeline_output(Some(f.path())).expect("load");
    assert_eq!(payload.get("elapsed_ms"), Some(&json!(812)));

    let report = validate_and_correct(&payload);
    assert!(report.is_valid);

    let rendered = render_run(&payload, &report, OutputFormat::Json).expect("render");
    let v: Value = serde_json::from_str(&rendered).expect("json");
    assert_eq!(v["report"]["is_valid"], json!(true));
    assert_eq!(
        v["report"]["corrected_output"]["structured_intent"]["entities"]["maptype"],
        json!(["散点图"])
    );
    assert_eq!(v["report"]["corrected_output"]["elapsed_ms"], json!(812));
    // The original text payload is echoed untouched.
    assert!(v["output"]["structured_intent"].is_string());
}

#[test]
fn markdown_rendering_goes_through_core_report() {
    let f = write_temp(r#"{"original_query": "q", "structured_intent": {"entities": {"theme": "禁毒"}}}"#);
    let payload = load_pipeline_output(Some(f.path())).expect("load");
    let report = validate_and_correct(&payload);
    let md = render_run(&payload, &report, OutputFormat::Markdown).expect("render");
    assert!(md.contains("| warning | INSUFFICIENT_CONTEXT |"));
    assert!(md.contains("**needs review**"));
}

#[test]
fn reports_missing_file_and_bad_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_pipeline_output(Some(&dir.path().join("missing.json"))).unwrap_err();
    assert_eq!(err.code, "IO_READ_FAILED");

    let f = write_temp("{ not json");
    let err = load_pipeline_output(Some(f.path())).unwrap_err();
    assert_eq!(err.code, "PAYLOAD_INVALID_JSON");
}

#[test]
fn entities_argument_must_be_an_object() {
    assert!(parse_entities(r#"{"poi": "点位"}"#).is_ok());
    assert_eq!(parse_entities("[]").unwrap_err().code, "PAYLOAD_INVALID_SHAPE");
    assert_eq!(parse_entities("poi").unwrap_err().code, "PAYLOAD_INVALID_JSON");
}
