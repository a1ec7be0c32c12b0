use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::timeouts::{
    DEFAULT_GENERATION_TIMEOUT_SECONDS, DEFAULT_MUTE_REPLY_DELAY_SECONDS,
    DEFAULT_TROLL_LONG_DELAY_SECONDS, DEFAULT_TROLL_SHORT_DELAY_SECONDS,
};

pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_USERS_FILE: &str = "/tmp/users_cache.json";
pub const DEFAULT_MUTED_FILE: &str = "/tmp/invisible_mutes.json";

#[derive(Debug, Clone)]
pub struct Settings {
    pub bot_token: String,
    /// Users allowed to drive the bot from a private chat
    pub admin_user_ids: Vec<i64>,
    /// Users who get troll replies even when they are not muted
    pub reactive_user_ids: Vec<i64>,
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub groq_api_base: String,
    pub users_file: PathBuf,
    pub muted_file: PathBuf,
    pub mute_reply_delay: Duration,
    pub troll_short_delay: Duration,
    pub troll_long_delay: Duration,
    /// Upper bound for one generator call
    pub generation_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        let bot_token =
            env::var("BOT_TOKEN").map_err(|_| "BOT_TOKEN environment variable not set")?;
        if bot_token.trim().is_empty() {
            return Err("BOT_TOKEN environment variable is empty".to_string());
        }

        let admin_user_ids = parse_id_list(&env::var("ADMIN_USER_ID").unwrap_or_default());
        let reactive_user_ids =
            parse_id_list(&env::var("REACTIVE_USER_IDS").unwrap_or_default());

        let groq_api_key = env::var("GROQ_API_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let groq_model = env::var("GROQ_MODEL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string());

        let groq_api_base = env::var("GROQ_API_BASE")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_GROQ_API_BASE.to_string());

        let users_file = env::var("USERS_FILE")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_USERS_FILE.to_string())
            .into();

        let muted_file = env::var("MUTED_FILE")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_MUTED_FILE.to_string())
            .into();

        Ok(Self {
            bot_token,
            admin_user_ids,
            reactive_user_ids,
            groq_api_key,
            groq_model,
            groq_api_base,
            users_file,
            muted_file,
            mute_reply_delay: secs_from_env(
                "MUTE_REPLY_DELAY_SECONDS",
                DEFAULT_MUTE_REPLY_DELAY_SECONDS,
            ),
            troll_short_delay: secs_from_env(
                "TROLL_SHORT_DELAY_SECONDS",
                DEFAULT_TROLL_SHORT_DELAY_SECONDS,
            ),
            troll_long_delay: secs_from_env(
                "TROLL_LONG_DELAY_SECONDS",
                DEFAULT_TROLL_LONG_DELAY_SECONDS,
            ),
            generation_timeout: secs_from_env(
                "GENERATION_TIMEOUT_SECONDS",
                DEFAULT_GENERATION_TIMEOUT_SECONDS,
            ),
        })
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_user_ids.contains(&user_id)
    }

    pub fn is_reactive(&self, user_id: i64) -> bool {
        self.reactive_user_ids.contains(&user_id)
    }
}

fn secs_from_env(name: &str, default: u64) -> Duration {
    let secs = env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default);
    Duration::from_secs(secs)
}

/// Parse a comma-separated list of ids, skipping blanks and garbage
pub fn parse_id_list(raw: &str) -> Vec<i64> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("1, 2,3"), vec![1, 2, 3]);
        assert_eq!(parse_id_list(""), Vec::<i64>::new());
        assert_eq!(parse_id_list("7,,abc, -100"), vec![7, -100]);
    }
}
