//! Language model backends
//!
//! The command loop only needs one capability from a model: given an
//! instruction block and the dialogue so far, return one text reply.
//! [`ChatModel`] captures that; [`GeminiClient`] implements it over the
//! Gemini `generateContent` REST endpoint.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

use crate::agent::Turn;
use crate::error::Result;

/// One request to the model
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Instruction preamble plus per-iteration context
    pub system: String,
    /// Dialogue history, oldest first
    pub turns: Vec<Turn>,
}

/// Trait for text-completion backends
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the request and return the raw reply text
    async fn generate(&self, request: &ChatRequest) -> Result<String>;

    /// Get model name
    fn model_name(&self) -> &str;
}
