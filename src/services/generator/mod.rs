pub mod groq;
pub mod safe;

use async_trait::async_trait;

use crate::bot::error::Error;

pub use groq::GroqClient;
pub use safe::SafeReplyGenerator;

/// External text generation service: prompt in, text (or nothing) out
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, Error>;
}
