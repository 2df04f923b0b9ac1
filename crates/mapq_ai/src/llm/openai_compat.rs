use std::time::Duration;

use mapq_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::{call_failed, messages, ChatMessage, Llm};

/// Client for hosted endpoints speaking the OpenAI chat-completions protocol
/// (for example a Qwen compatible-mode endpoint).
#[derive(Clone)]
pub struct OpenAiCompatLlm {
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiCompatLlm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatLlm")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiCompatLlm {
    /// Remote endpoints must use TLS and carry a key.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("https://") {
            return Err(AppError::new(
                "AI_REMOTE_NOT_ALLOWED",
                "Remote chat endpoint must use https",
            )
            .with_details(format!("base_url={base_url}")));
        }
        if api_key.trim().is_empty() {
            return Err(AppError::config("An API key is required for the openai backend"));
        }
        Ok(Self {
            base_url,
            api_key: api_key.trim().to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Clone, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

impl Llm for OpenAiCompatLlm {
    fn chat(&self, model: &str, system: &str, user: &str) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.base_url);
        let req = CompletionRequest {
            model,
            messages: messages(system, user),
            temperature: 0.0,
            stream: false,
        };

        let body = serde_json::to_value(req).map_err(|e| {
            AppError::new("AI_LLM_FAILED", "Failed to encode chat request")
                .with_details(e.to_string())
        })?;

        let resp = ureq::post(&url)
            .timeout(self.timeout)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(body)
            .map_err(|e| call_failed("OpenAI-compatible", e))?;

        let v: CompletionResponse = resp.into_json().map_err(|e| {
            AppError::new("AI_LLM_FAILED", "Failed to decode chat response")
                .with_details(e.to_string())
        })?;

        let content = v
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(AppError::new("AI_LLM_FAILED", "Chat response was empty"));
        }
        Ok(content)
    }
}
