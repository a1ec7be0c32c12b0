use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bot::error::Error;
use crate::services::generator::ReplyGenerator;

/// Sampling used for troll replies: hot and short
const TEMPERATURE: f32 = 1.4;
const TOP_P: f32 = 0.93;
const MAX_TOKENS: u32 = 30;

// OpenAI-compatible request/response
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

/// Groq chat-completions client
pub struct GroqClient {
    api_key: String,
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl GroqClient {
    pub fn new(api_key: &str, api_base: &str, model: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key.trim().to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        }
    }
}

#[async_trait]
impl ReplyGenerator for GroqClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, Error> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            top_p: TOP_P,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Generation(format!("{}: {}", status, text)));
        }

        let parsed: ChatResponse = response.json().await?;
        Ok(first_content(parsed))
    }
}

fn first_content(response: ChatResponse) -> Option<String> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)?;
    let content = content.trim();
    if content.is_empty() {
        debug!("Generator returned an empty completion");
        None
    } else {
        Some(content.to_string())
    }
}
