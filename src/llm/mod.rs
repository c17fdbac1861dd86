//! Language model access.
//!
//! Components that talk to the model take a `&dyn LanguageModel` (or a
//! generic `M: LanguageModel`) so one configured client can be shared by
//! the analyzer and the report synthesizer.

pub mod client;

pub use client::OpenAiClient;

use crate::error::LlmError;
use async_trait::async_trait;

/// A single system + user exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

impl ChatRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>, temperature: f32) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature,
        }
    }
}

/// Something that can answer a chat request with text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send one request and return the assistant's reply.
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;

    /// Name of the model answering requests.
    fn model_name(&self) -> &str;
}
