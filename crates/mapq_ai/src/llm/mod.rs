use mapq_core::error::AppError;

/// One-shot chat completion: a system instruction plus a single user message.
///
/// Implementations run deterministically (temperature 0, no streaming) and treat an empty
/// completion as an error.
pub trait Llm {
    fn chat(&self, model: &str, system: &str, user: &str) -> Result<String, AppError>;
}

pub mod ollama_llm;
pub mod openai_compat;

#[derive(Debug, Clone, serde::Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

pub(crate) fn messages<'a>(system: &'a str, user: &'a str) -> Vec<ChatMessage<'a>> {
    vec![
        ChatMessage {
            role: "system",
            content: system,
        },
        ChatMessage {
            role: "user",
            content: user,
        },
    ]
}

/// Map a `ureq` response or transport error to the shared error shape.
pub(crate) fn call_failed(backend: &str, err: ureq::Error) -> AppError {
    match err {
        ureq::Error::Status(status, resp) => {
            let body = resp.into_string().unwrap_or_default();
            let body: String = body.chars().take(300).collect();
            AppError::new("AI_LLM_FAILED", format!("{backend} chat request failed"))
                .with_details(format!("status={status}; body={body}"))
                .with_retryable(status == 429 || status >= 500)
        }
        ureq::Error::Transport(t) => {
            AppError::new("AI_LLM_FAILED", format!("Failed to call {backend} chat endpoint"))
                .with_details(t.to_string())
                .with_retryable(true)
        }
    }
}
