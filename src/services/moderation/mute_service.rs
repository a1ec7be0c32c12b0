use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{debug, info};

use crate::bot::data::Data;
use crate::constants::timeouts::EXPIRY_SWEEP_INTERVAL;
use crate::db::models::ChatUser;
use crate::utils::formatting::now_epoch;

/// Invisibly mute a user for `seconds`, replacing any earlier mute.
/// Arms a timer that removes the record when it runs out, unless it was
/// replaced or cleared in the meantime. Returns the new expiry.
pub async fn mute_user(data: &Arc<Data>, key: ChatUser, seconds: u64) -> f64 {
    let expiry = data.mutes.set_mute(key, seconds as f64, now_epoch()).await;

    info!(
        "User {} muted in chat {} for {}s",
        key.user_id, key.chat_id, seconds
    );

    spawn_expiry_timer(data.clone(), key, expiry, Duration::from_secs(seconds));
    expiry
}

/// Lift a mute. Returns whether the user was muted at all.
pub async fn unmute_user(data: &Arc<Data>, key: ChatUser) -> bool {
    let had_mute = data.mutes.clear_mute(key).await;

    if had_mute {
        // A queued "you're muted" reply would now be wrong
        data.scheduler.cancel(&key);
        info!("User {} unmuted in chat {}", key.user_id, key.chat_id);
    }

    had_mute
}

/// Arm the expiry timer for a record that already exists, such as one that
/// moved to a new chat id
pub fn rearm_expiry(data: &Arc<Data>, key: ChatUser, expiry: f64) {
    let after = Duration::from_secs_f64((expiry - now_epoch()).max(0.0));
    spawn_expiry_timer(data.clone(), key, expiry, after);
}

fn spawn_expiry_timer(data: Arc<Data>, key: ChatUser, expiry: f64, after: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;

        if data.mutes.expire_if_unchanged(key, expiry, now_epoch()).await {
            info!("Auto-unmute: user {} in chat {}", key.user_id, key.chat_id);
        } else {
            debug!(
                "Expiry timer for {} found a newer mute or none, leaving it",
                key
            );
        }
    });
}

/// Start the background sweep that drops expired mutes, including ones whose
/// timers were lost to a restart
pub fn spawn_expiry_sweeper(data: Arc<Data>) {
    tokio::spawn(async move {
        let mut ticker = interval(EXPIRY_SWEEP_INTERVAL);

        loop {
            ticker.tick().await;
            sweep_once(&data).await;
        }
    });
}

async fn sweep_once(data: &Arc<Data>) -> usize {
    let expired = data.mutes.sweep_expired(now_epoch()).await;
    for key in &expired {
        info!(
            "Expired mute swept: user {} in chat {}",
            key.user_id, key.chat_id
        );
    }
    expired.len()
}
