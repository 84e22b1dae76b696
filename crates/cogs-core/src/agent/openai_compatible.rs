//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API
//! (api.openai.com, vLLM, LocalAI, llama-server, ...).
//!
//! # Configuration
//!
//! Resolved through `AgentConfig`:
//! - `OPENAI_COMPATIBLE_HOST`: server URL (default: https://api.openai.com)
//! - `OPENAI_MODEL`: model name (default: gpt-4o-mini)
//! - `OPENAI_API_KEY`: bearer credential, sent as-is even when empty

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AgentConfig;
use crate::context::AgentContext;
use crate::error::{Error, Result};

use super::parsing::parse_answer;
use super::types::AgentReply;
use super::AgentBackend;

/// OpenAI-compatible backend
///
/// Sends one chat completion per question: the system instruction plus a
/// user turn carrying `{"context": ..., "question": ...}` as JSON.
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl OpenAICompatibleBackend {
    /// Create a new backend with no credential and the default temperature
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: String::new(),
            temperature: 0.2,
        }
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        let mut backend = Self::new(base_url, model);
        backend.api_key = api_key.to_string();
        backend
    }

    /// Create from resolved configuration
    pub fn from_config(config: &AgentConfig) -> Self {
        Self::with_api_key(&config.base_url, &config.model, &config.api_key)
            .with_temperature(config.temperature)
    }

    /// Override the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Make a chat completion request and return the first choice's content
    async fn chat_completion(&self, system: &str, user: String) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            temperature: Some(self.temperature),
            stream: false,
        };

        debug!(
            model = %self.model,
            host = %self.base_url,
            system_chars = system.len(),
            user_chars = request.messages[1].content.len(),
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::InvalidData(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| Error::InvalidData("No response from OpenAI API".into()))?;

        debug!(chars = content.len(), "Received chat completion");
        Ok(content)
    }
}

/// User-turn payload
#[derive(Debug, Serialize)]
struct UserPayload<'a> {
    context: &'a AgentContext,
    question: &'a str,
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

/// Chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

/// Chat response message (content may be null for tool-call replies)
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl AgentBackend for OpenAICompatibleBackend {
    async fn answer(
        &self,
        system: &str,
        context: &AgentContext,
        question: &str,
    ) -> Result<AgentReply> {
        let user = serde_json::to_string(&UserPayload { context, question })?;
        let content = self.chat_completion(system, user).await?;
        Ok(parse_answer(&content))
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
