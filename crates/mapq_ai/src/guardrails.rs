use mapq_core::error::AppError;
use serde_json::Value;

/// Remove a surrounding Markdown code fence (```` ```json ```` or plain ```` ``` ````).
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "JSON", ...) up to the first newline.
    let body = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Enforce that extraction output is a single JSON object without a model-reported error.
pub fn parse_intent_json(raw: &str) -> Result<Value, AppError> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body).map_err(|e| {
        AppError::new("AI_INTENT_INVALID_JSON", "Model output is not valid JSON")
            .with_details(format!("err={e}; output_prefix={}", prefix(body)))
    })?;

    let Value::Object(map) = &value else {
        return Err(AppError::new(
            "AI_INTENT_NOT_OBJECT",
            "Model output must be a JSON object",
        )
        .with_details(format!("output_prefix={}", prefix(body))));
    };

    if let Some(err) = map.get("error").filter(|e| mapq_core::normalize::is_truthy(e)) {
        let details = err.as_str().map(str::to_string).unwrap_or_else(|| err.to_string());
        return Err(AppError::new(
            "AI_INTENT_MODEL_ERROR",
            "Model reported an extraction error",
        )
        .with_details(details));
    }

    Ok(value)
}

fn prefix(s: &str) -> String {
    s.chars().take(120).collect()
}
