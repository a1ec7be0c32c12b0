use std::time::Duration;

/// Reply delays (defaults, can be overridden via env vars)
pub const DEFAULT_MUTE_REPLY_DELAY_SECONDS: u64 = 3; // Muted user keeps writing
pub const DEFAULT_TROLL_SHORT_DELAY_SECONDS: u64 = 5; // Short message from the reactive cohort
pub const DEFAULT_TROLL_LONG_DELAY_SECONDS: u64 = 10; // Long message from the reactive cohort

/// Messages with more words than this get the long troll delay
pub const SHORT_MESSAGE_MAX_WORDS: usize = 10;

/// Upper bound for a single call into the generation service
pub const DEFAULT_GENERATION_TIMEOUT_SECONDS: u64 = 15;

/// Attempts made by the safe generator before falling back to the local pool
pub const GENERATION_ATTEMPTS: usize = 3;

/// Slack allowed when an expiry timer compares its own expiry with the stored one
pub const EXPIRY_TOLERANCE_SECONDS: f64 = 2.0;

/// Interval of the proactive expired-mute sweep
pub const EXPIRY_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Long-polling timeout for getUpdates
pub const POLL_TIMEOUT_SECONDS: u64 = 30;

/// Back-off after a failed getUpdates call
pub const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Mute durations offered to operators: (label, seconds)
pub const MUTE_DURATIONS: &[(&str, u64)] = &[
    ("1 min", 60),
    ("5 min", 300),
    ("10 min", 600),
    ("1 h", 3600),
    ("3 h", 3 * 3600),
    ("12 h", 12 * 3600),
    ("24 h", 24 * 3600),
    ("year", ONE_YEAR_SECONDS),
];

pub const ONE_YEAR_SECONDS: u64 = 365 * 24 * 3600;

/// Format a mute duration for operator feedback
pub fn format_mute_duration(seconds: u64) -> String {
    if seconds == ONE_YEAR_SECONDS {
        "a year".to_string()
    } else if seconds >= 3600 {
        format!("{} h", seconds / 3600)
    } else if seconds >= 60 {
        format!("{} min", seconds / 60)
    } else {
        format!("{} sec", seconds)
    }
}
