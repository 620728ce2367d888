//! llm_client - Text generation collaborator
//!
//! The bot core calls `ChatGenerator` for two things only: a short title
//! for a new conversation and a reply to a prompt with bounded history.

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use openai::OpenAiGenerator;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("empty completion")]
    EmptyCompletion,
}

pub type Result<T> = std::result::Result<T, LlmError>;

/// One prior turn passed as generation context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Text generation seam.
#[async_trait]
pub trait ChatGenerator: Send + Sync {
    /// Generate a short conversation title for the opening prompt.
    async fn generate_title(&self, prompt: &str) -> Result<String>;

    /// Generate a reply to `prompt` given prior turns, oldest first.
    async fn generate_reply(&self, prompt: &str, history: &[ChatTurn]) -> Result<String>;
}
