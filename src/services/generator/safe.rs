use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::constants::timeouts::GENERATION_ATTEMPTS;
use crate::services::generator::ReplyGenerator;
use crate::utils::forbidden::forbidden_match;
use crate::utils::formatting::sanitize_reply;

/// Pick a random line from a fallback pool
pub fn pick_fallback(pool: &[&str]) -> String {
    pool.choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("🤫")
        .to_string()
}

/// Wraps the generation service with a generate-until-safe-or-fallback policy.
/// Never returns an error: outages degrade to local fallback text.
pub struct SafeReplyGenerator {
    generator: Option<Arc<dyn ReplyGenerator>>,
    /// Upper bound for each attempt
    timeout: Duration,
}

impl SafeReplyGenerator {
    pub fn new(generator: Option<Arc<dyn ReplyGenerator>>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Generate a reply that passes the topic filter.
    ///
    /// - no generator configured: a fallback line
    /// - first answer empty: `None` (stay silent)
    /// - forbidden answer: retried, up to `GENERATION_ATTEMPTS` attempts in total
    /// - errors and timeouts count as failed attempts
    /// - every attempt failed or forbidden: a fallback line
    pub async fn generate_safe(&self, prompt: &str, fallbacks: &[&str]) -> Option<String> {
        let Some(generator) = &self.generator else {
            return Some(pick_fallback(fallbacks));
        };

        for attempt in 1..=GENERATION_ATTEMPTS {
            let raw = match tokio::time::timeout(self.timeout, generator.generate(prompt)).await {
                Ok(Ok(raw)) => raw,
                Ok(Err(e)) => {
                    warn!("Generation attempt {} failed: {}", attempt, e);
                    continue;
                }
                Err(_) => {
                    warn!(
                        "Generation attempt {} timed out after {:?}",
                        attempt, self.timeout
                    );
                    continue;
                }
            };

            let text = raw.map(|r| sanitize_reply(&r)).unwrap_or_default();
            if text.is_empty() {
                if attempt == 1 {
                    debug!("Generator had nothing to say, staying silent");
                    return None;
                }
                continue;
            }

            match forbidden_match(&text) {
                Some(word) => {
                    debug!(
                        "Generation attempt {} rejected (forbidden topic {:?})",
                        attempt, word
                    );
                }
                None => return Some(text),
            }
        }

        warn!(
            "No usable reply after {} attempts, using fallback",
            GENERATION_ATTEMPTS
        );
        Some(pick_fallback(fallbacks))
    }
}
