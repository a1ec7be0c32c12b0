use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error: {description}")]
    Telegram {
        description: String,
        /// Set when the target group was upgraded to a supergroup
        migrate_to_chat_id: Option<i64>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Generation failed: {0}")]
    Generation(String),

    /// Malformed operator command; the message is shown back to the operator
    #[error("{0}")]
    InvalidCommand(String),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        Error::Custom(msg.into())
    }

    pub fn telegram<S: Into<String>>(description: S, migrate_to_chat_id: Option<i64>) -> Self {
        Error::Telegram {
            description: description.into(),
            migrate_to_chat_id,
        }
    }
}
