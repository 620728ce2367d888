//! OpenAI-compatible chat completions client, non-streaming

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::{ChatGenerator, ChatTurn, LlmError, Result};

const TITLE_INSTRUCTION: &str =
    "Generate a title of at most five words for a conversation that starts \
     with the following prompt. Reply with the title only, no quotes.";

pub struct OpenAiGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn complete(&self, messages: serde_json::Value) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": messages,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            return Err(LlmError::Api(format!("HTTP {status}: {text}")));
        }

        let completion: CompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(LlmError::EmptyCompletion);
        }
        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl ChatGenerator for OpenAiGenerator {
    async fn generate_title(&self, prompt: &str) -> Result<String> {
        log::debug!("generating title for prompt of {} chars", prompt.len());
        self.complete(json!([
            { "role": "system", "content": TITLE_INSTRUCTION },
            { "role": "user", "content": prompt },
        ]))
        .await
    }

    async fn generate_reply(&self, prompt: &str, history: &[ChatTurn]) -> Result<String> {
        log::debug!(
            "generating reply with {} prior turns for prompt of {} chars",
            history.len(),
            prompt.len()
        );
        let mut messages: Vec<serde_json::Value> = history
            .iter()
            .map(|turn| json!({ "role": turn.role, "content": turn.content }))
            .collect();
        messages.push(json!({ "role": "user", "content": prompt }));
        self.complete(serde_json::Value::Array(messages)).await
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize, Default)]
struct CompletionMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_response_deserializes() {
        let json = r#"{
            "id": "cmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "Hello!" } }
            ]
        }"#;
        let response: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.choices[0].message.content.as_deref(),
            Some("Hello!")
        );
    }

    #[test]
    fn test_history_precedes_prompt() {
        let history = vec![ChatTurn::user("q1"), ChatTurn::assistant("a1")];
        let mut messages: Vec<serde_json::Value> = history
            .iter()
            .map(|turn| json!({ "role": turn.role, "content": turn.content }))
            .collect();
        messages.push(json!({ "role": "user", "content": "q2" }));
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2]["content"], "q2");
    }
}
