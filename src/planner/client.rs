//! OpenRouter-backed planner client.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::conversation::Conversation;

use super::reply::{parse_reply, StructuredReply};
use super::{Planner, PlannerError};

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Planner client speaking the OpenRouter chat-completions API.
pub struct OpenRouterClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenRouterClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
        }
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

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[async_trait]
impl Planner for OpenRouterClient {
    async fn next_reply(
        &self,
        conversation: &Conversation,
    ) -> Result<StructuredReply, PlannerError> {
        let body = json!({
            "model": self.model,
            "messages": conversation.messages(),
            "response_format": { "type": "json_object" },
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", OPENROUTER_BASE_URL))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(500).collect();
            return Err(PlannerError::Status {
                status: status.as_u16(),
                body: preview,
            });
        }

        let completion: CompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                PlannerError::Malformed("completion had no message content".to_string())
            })?;

        tracing::debug!("planner raw reply: {}", content);
        parse_reply(&content)
    }
}
