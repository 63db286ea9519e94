//! Chat Completions API client
//!
//! One synchronous (awaited) request per user turn: the persona's system
//! prompt plus the full conversation, fixed model, fixed temperature. No
//! streaming, no retry, no timeout override.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::conversation::Turn;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Sampling temperature, fixed by design
pub const TEMPERATURE: f32 = 0.7;

/// Request to the Chat Completions API
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ApiMessage>,
    pub temperature: f32,
}

/// One entry in the request's message list
#[derive(Debug, Clone, Serialize)]
pub struct ApiMessage {
    pub role: String,
    pub content: String,
}

impl ApiMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }
}

impl From<&Turn> for ApiMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role.as_str().into(),
            content: turn.content.clone(),
        }
    }
}

/// Response from the Chat Completions API
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage, reported for diagnostics only
#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if the service returned any
    pub fn text(&self) -> Option<&str> {
        self.choices.first()?.message.content.as_deref()
    }
}

/// Chat Completions client
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl Client {
    /// Create a new client against the default OpenAI endpoint
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            api_base: DEFAULT_API_BASE.into(),
            model: DEFAULT_MODEL.into(),
        }
    }

    /// Point the client at an OpenAI-compatible gateway
    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    /// Use a different (still fixed) model identifier
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Create a completion for the system prompt plus conversation turns.
    /// The system prompt is prepended at call time only; it is never part of
    /// the stored conversation.
    pub async fn create(&self, system_prompt: &str, turns: &[Turn]) -> Result<ChatCompletionResponse> {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(ApiMessage::system(system_prompt));
        messages.extend(turns.iter().map(ApiMessage::from));

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: TEMPERATURE,
        };

        self.send_request(&request).await
    }

    async fn send_request(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        let url = format!("{}/chat/completions", self.api_base);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error {}: {}", status, body);
        }

        // Get raw text first so parse failures can show what came back
        let text = response.text().await?;

        let result: ChatCompletionResponse = serde_json::from_str(&text).map_err(|e| {
            let preview = if text.len() > 500 { &text[..500] } else { &text };
            anyhow::anyhow!("JSON parse error: {}. Response preview: {}", e, preview)
        })?;

        Ok(result)
    }
}
