pub mod config;
pub mod guardrails;
pub mod llm;
pub mod ollama;
pub mod pipeline;
pub mod prompts;
