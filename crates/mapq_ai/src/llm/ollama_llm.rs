use mapq_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::{call_failed, messages, ChatMessage, Llm};
use crate::ollama::OllamaClient;

#[derive(Debug, Clone)]
pub struct OllamaLlm {
    client: OllamaClient,
}

impl OllamaLlm {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

impl Llm for OllamaLlm {
    fn chat(&self, model: &str, system: &str, user: &str) -> Result<String, AppError> {
        let url = format!("{}/api/chat", self.client.base_url());
        let req = ChatRequest {
            model,
            messages: messages(system, user),
            stream: false,
            options: ChatOptions { temperature: 0.0 },
        };

        let body = serde_json::to_value(req).map_err(|e| {
            AppError::new("AI_LLM_FAILED", "Failed to encode chat request")
                .with_details(e.to_string())
        })?;

        let resp = ureq::post(&url)
            .timeout(self.client.timeout())
            .send_json(body)
            .map_err(|e| call_failed("Ollama", e))?;

        let v: ChatResponse = resp.into_json().map_err(|e| {
            AppError::new("AI_LLM_FAILED", "Failed to decode chat response")
                .with_details(e.to_string())
        })?;
        if v.message.content.trim().is_empty() {
            return Err(AppError::new("AI_LLM_FAILED", "Chat response was empty"));
        }
        Ok(v.message.content)
    }
}
