use std::time::Duration;

use mapq_core::error::AppError;

use crate::llm::ollama_llm::OllamaLlm;
use crate::llm::openai_compat::OpenAiCompatLlm;
use crate::llm::Llm;
use crate::ollama::OllamaClient;

pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5:7b";
pub const DEFAULT_OPENAI_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "qwen-plus";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Ollama,
    OpenAi,
}

impl Backend {
    fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "ollama" => Ok(Backend::Ollama),
            "openai" | "openai-compat" | "dashscope" => Ok(Backend::OpenAi),
            other => Err(AppError::config("Unknown LLM backend")
                .with_details(format!("MAPQ_LLM_BACKEND={other}; expected ollama|openai"))),
        }
    }
}

/// Model backend settings, read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct LlmSettings {
    pub backend: Backend,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("backend", &self.backend)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LlmSettings {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = Backend::parse(&get("MAPQ_LLM_BACKEND").unwrap_or_default())?;
        let (default_url, default_model) = match backend {
            Backend::Ollama => (DEFAULT_OLLAMA_URL, DEFAULT_OLLAMA_MODEL),
            Backend::OpenAi => (DEFAULT_OPENAI_URL, DEFAULT_OPENAI_MODEL),
        };

        let timeout_secs = match get("MAPQ_LLM_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(AppError::config("Invalid LLM timeout")
                        .with_details(format!("MAPQ_LLM_TIMEOUT_SECS={raw}")))
                }
            },
        };

        Ok(Self {
            backend,
            base_url: get("MAPQ_LLM_BASE_URL").unwrap_or_else(|| default_url.to_string()),
            model: get("MAPQ_LLM_MODEL").unwrap_or_else(|| default_model.to_string()),
            api_key: get("MAPQ_LLM_API_KEY").or_else(|| get("DASHSCOPE_API_KEY")),
            timeout_secs,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn build_llm(&self) -> Result<Box<dyn Llm>, AppError> {
        match self.backend {
            Backend::Ollama => {
                let client = OllamaClient::new(&self.base_url)?.with_timeout(self.timeout());
                Ok(Box::new(OllamaLlm::new(client)))
            }
            Backend::OpenAi => {
                let key = self.api_key.as_deref().unwrap_or_default();
                Ok(Box::new(OpenAiCompatLlm::new(
                    &self.base_url,
                    key,
                    self.timeout(),
                )?))
            }
        }
    }
}
