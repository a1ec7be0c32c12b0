pub mod payload;
pub mod telegram;
pub mod types;

use async_trait::async_trait;

use crate::bot::error::Error;

pub use payload::OutboundPayload;
pub use telegram::TelegramApi;
pub use types::ChatInfo;

/// Outbound side of the chat platform
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a text message, optionally as a reply to `reply_to`
    async fn send_text(&self, chat_id: i64, text: &str, reply_to: Option<i64>)
        -> Result<(), Error>;

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), Error>;

    /// Relay arbitrary content into a chat
    async fn send_payload(&self, chat_id: i64, payload: &OutboundPayload) -> Result<(), Error>;

    async fn get_chat(&self, chat_id: i64) -> Result<ChatInfo, Error>;

    /// Id of the bot account itself
    async fn get_me(&self) -> Result<i64, Error>;
}
