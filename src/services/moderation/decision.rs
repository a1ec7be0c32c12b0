use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::bot::data::Data;
use crate::config::Settings;
use crate::constants::replies::{
    muted_prompt, troll_prompt, COHORT_MUTE_REPLIES, MUTE_FALLBACKS, TROLL_FALLBACKS,
};
use crate::constants::timeouts::SHORT_MESSAGE_MAX_WORDS;
use crate::db::models::{ChatUser, KnownUser};
use crate::messaging::types::{Message, User};
use crate::services::generator::safe::pick_fallback;
use crate::services::moderation::mute_service;
use crate::services::scheduler::SlotGuard;
use crate::utils::forbidden::is_forbidden;
use crate::utils::formatting::{now_epoch, word_count};

/// What to do with one inbound group message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No side effects at all
    Ignore,
    /// The group was upgraded; move stored state to the new id
    Migrate { from: i64, to: i64 },
    /// Sender is muted: delete the message and schedule a flat reply
    MuteReply,
    /// Sender is in the reactive cohort: schedule a reply to this message
    TrollReply { delay: Duration },
}

/// Troll delay tier for a message: short messages are answered sooner
pub fn troll_delay(settings: &Settings, text: &str) -> Duration {
    if word_count(text) <= SHORT_MESSAGE_MAX_WORDS {
        settings.troll_short_delay
    } else {
        settings.troll_long_delay
    }
}

/// Human sender of a group message, or None for anything the bot ignores
fn moderated_sender(bot_user_id: i64, message: &Message) -> Option<&User> {
    if !message.chat.kind.is_group() {
        return None;
    }
    message
        .from
        .as_ref()
        .filter(|user| !user.is_bot && user.id != bot_user_id)
}

/// Classify a message. `muted` is the sender's mute state at evaluation time.
pub fn decide(settings: &Settings, bot_user_id: i64, message: &Message, muted: bool) -> Decision {
    if let Some(to) = message.migrate_to_chat_id {
        return Decision::Migrate {
            from: message.chat.id,
            to,
        };
    }

    let Some(sender) = moderated_sender(bot_user_id, message) else {
        return Decision::Ignore;
    };

    if muted {
        return Decision::MuteReply;
    }

    if settings.is_reactive(sender.id) {
        let text = message.content();
        if !text.is_empty() && !is_forbidden(text) {
            return Decision::TrollReply {
                delay: troll_delay(settings, text),
            };
        }
    }

    Decision::Ignore
}

/// Run moderation for one inbound group message and return what was decided
pub async fn handle_group_message(data: &Arc<Data>, message: &Message) -> Decision {
    if message.migrate_to_chat_id.is_some() {
        let decision = decide(&data.settings, data.bot_user_id, message, false);
        if let Decision::Migrate { from, to } = decision {
            relocate_chat(data, from, to).await;
        }
        return decision;
    }

    let Some(sender) = moderated_sender(data.bot_user_id, message) else {
        return Decision::Ignore;
    };

    let key = ChatUser::new(message.chat.id, sender.id);

    data.users
        .record(
            key.chat_id,
            KnownUser {
                id: sender.id,
                first_name: sender.first_name.clone(),
                last_name: sender.last_name.clone().unwrap_or_default(),
                username: sender.username.clone().unwrap_or_default(),
            },
        )
        .await;

    let muted = data.mutes.is_muted(key, now_epoch()).await;
    let decision = decide(&data.settings, data.bot_user_id, message, muted);

    match &decision {
        Decision::MuteReply => {
            // Best-effort: the bot may lack delete rights
            if let Err(e) = data
                .messenger
                .delete_message(key.chat_id, message.message_id)
                .await
            {
                warn!(
                    "Failed to delete message {} from muted user {}: {}",
                    message.message_id, key.user_id, e
                );
            }

            arm_mute_reply(data, key, sender.short_name());
        }
        Decision::TrollReply { delay } => {
            arm_troll_reply(
                data,
                key,
                *delay,
                message.message_id,
                message.content().to_string(),
            );
        }
        Decision::Ignore | Decision::Migrate { .. } => {}
    }

    decision
}

async fn relocate_chat(data: &Arc<Data>, from: i64, to: i64) {
    let users_moved = data.users.relocate_chat(from, to).await;
    let mutes_moved = data.mutes.relocate_chat(from, to).await;
    let cancelled = data.scheduler.cancel_where(|key| key.chat_id == from);

    // Timers armed for the old keys no longer match anything
    for record in &mutes_moved {
        mute_service::rearm_expiry(data, record.key, record.expires_at);
    }

    info!(
        "Chat migrated: {} -> {} (users moved: {}, mutes moved: {}, replies cancelled: {})",
        from,
        to,
        users_moved,
        mutes_moved.len(),
        cancelled
    );
}

/// Debounced flat reply to a muted user; the reply mode is fixed here, at arm time
fn arm_mute_reply(data: &Arc<Data>, key: ChatUser, sender_name: String) {
    let reactive = data.settings.is_reactive(key.user_id);
    let task_data = data.clone();

    data.scheduler.arm(
        key,
        data.settings.mute_reply_delay,
        None,
        move |_anchor, guard| async move {
            fire_mute_reply(task_data, key, sender_name, reactive, guard).await;
        },
    );
}

async fn fire_mute_reply(
    data: Arc<Data>,
    key: ChatUser,
    sender_name: String,
    reactive: bool,
    guard: SlotGuard<ChatUser>,
) {
    let text = if reactive {
        pick_fallback(COHORT_MUTE_REPLIES)
    } else {
        data.replies
            .generate_safe(&muted_prompt(&sender_name), MUTE_FALLBACKS)
            .await
            .unwrap_or_else(|| pick_fallback(MUTE_FALLBACKS))
    };

    if !guard.is_current() {
        debug!("Mute reply for {} superseded, dropping it", key);
        return;
    }

    if let Err(e) = data.messenger.send_text(key.chat_id, &text, None).await {
        warn!("Failed to send mute reply in chat {}: {}", key.chat_id, e);
    }

    // The mute may have run out (or been lifted) while this reply waited
    let now = now_epoch();
    if let Some(expiry) = data.mutes.expiry_of(key).await {
        if expiry <= now && data.mutes.expire_if_unchanged(key, expiry, now).await {
            info!(
                "Mute of user {} in chat {} ran out, removed",
                key.user_id, key.chat_id
            );
        }
    }
}

/// Debounced reply anchored to the latest message of the sender's burst
fn arm_troll_reply(data: &Arc<Data>, key: ChatUser, delay: Duration, anchor: i64, text: String) {
    let task_data = data.clone();

    data.scheduler
        .arm(key, delay, Some(anchor), move |anchor, guard| async move {
            fire_troll_reply(task_data, key, anchor, text, guard).await;
        });
}

async fn fire_troll_reply(
    data: Arc<Data>,
    key: ChatUser,
    anchor: Option<i64>,
    text: String,
    guard: SlotGuard<ChatUser>,
) {
    let Some(reply) = data
        .replies
        .generate_safe(&troll_prompt(&text), TROLL_FALLBACKS)
        .await
    else {
        debug!("Nothing to say to {}, staying silent", key);
        return;
    };

    if !guard.is_current() {
        debug!("Troll reply for {} superseded, dropping it", key);
        return;
    }

    if let Err(e) = data.messenger.send_text(key.chat_id, &reply, anchor).await {
        warn!("Failed to send reply in chat {}: {}", key.chat_id, e);
    }
}
