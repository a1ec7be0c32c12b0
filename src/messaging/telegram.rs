use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::bot::error::Error;
use crate::constants::timeouts::POLL_TIMEOUT_SECONDS;
use crate::messaging::types::{ChatInfo, Update, User};
use crate::messaging::{Messenger, OutboundPayload};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Envelope every Bot API call answers with
#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    migrate_to_chat_id: Option<i64>,
}

/// Thin Telegram Bot API client
pub struct TelegramApi {
    base_url: String,
    client: reqwest::Client,
}

impl TelegramApi {
    pub fn new(token: &str) -> Self {
        // Must outlive the long-polling timeout
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECONDS + 15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: format!("{}/bot{}", TELEGRAM_API_BASE, token.trim()),
            client,
        }
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, Error> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": POLL_TIMEOUT_SECONDS,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T, Error> {
        let url = format!("{}/{}", self.base_url, method);
        let response = self.client.post(&url).json(&body).send().await?;
        let envelope: ApiResponse<T> = response.json().await?;
        decode_envelope(method, envelope)
    }
}

fn decode_envelope<T>(method: &str, envelope: ApiResponse<T>) -> Result<T, Error> {
    if !envelope.ok {
        let description = envelope
            .description
            .unwrap_or_else(|| format!("{} failed", method));
        let migrate_to = envelope.parameters.and_then(|p| p.migrate_to_chat_id);
        debug!("Telegram {} rejected: {}", method, description);
        return Err(Error::telegram(description, migrate_to));
    }
    envelope
        .result
        .ok_or_else(|| Error::telegram(format!("{} returned no result", method), None))
}

#[async_trait]
impl Messenger for TelegramApi {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<(), Error> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if let Some(message_id) = reply_to {
            body["reply_parameters"] = json!({
                "message_id": message_id,
                "allow_sending_without_reply": true,
            });
        }
        let _: Value = self.call("sendMessage", body).await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), Error> {
        let _: bool = self
            .call(
                "deleteMessage",
                json!({ "chat_id": chat_id, "message_id": message_id }),
            )
            .await?;
        Ok(())
    }

    async fn send_payload(&self, chat_id: i64, payload: &OutboundPayload) -> Result<(), Error> {
        let _: Value = self.call(payload.method(), payload.body(chat_id)).await?;
        Ok(())
    }

    async fn get_chat(&self, chat_id: i64) -> Result<ChatInfo, Error> {
        self.call("getChat", json!({ "chat_id": chat_id })).await
    }

    async fn get_me(&self) -> Result<i64, Error> {
        let me: User = self.call("getMe", json!({})).await?;
        Ok(me.id)
    }
}
