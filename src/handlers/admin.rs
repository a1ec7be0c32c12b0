use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::timeouts::{format_mute_duration, MUTE_DURATIONS};
use crate::db::models::ChatUser;
use crate::messaging::types::Message;
use crate::messaging::OutboundPayload;
use crate::services::moderation::mute_service;
use crate::utils::formatting::{now_epoch, truncate};

/// Commands an operator can send to the bot in a private chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Start,
    Groups,
    Users { chat_id: i64 },
    Mutes,
    Mute { chat_id: i64, user_id: i64, seconds: u64 },
    Unmute { chat_id: i64, user_id: i64 },
    Target { chat_id: i64 },
    Stop,
    Clear,
}

impl OperatorCommand {
    /// Parse "/name arg..." text. Errors carry a usage hint for the operator.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut parts = text.split_whitespace();
        let name = parts.next().unwrap_or_default();
        // "/mute@SomeBot" in group-style addressing
        let name = name.split('@').next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        let usage = |hint: &str| Error::InvalidCommand(format!("Usage: {}", hint));
        let id = |i: usize, hint: &str| -> Result<i64, Error> {
            args.get(i)
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| usage(hint))
        };

        match name {
            "/start" | "/help" => Ok(Self::Start),
            "/groups" => Ok(Self::Groups),
            "/users" => Ok(Self::Users {
                chat_id: id(0, "/users <chat_id>")?,
            }),
            "/mutes" => Ok(Self::Mutes),
            "/mute" => {
                let hint = "/mute <chat_id> <user_id> <seconds>";
                let seconds = args
                    .get(2)
                    .and_then(|s| s.parse::<u64>().ok())
                    .filter(|s| *s > 0)
                    .ok_or_else(|| usage(hint))?;
                Ok(Self::Mute {
                    chat_id: id(0, hint)?,
                    user_id: id(1, hint)?,
                    seconds,
                })
            }
            "/unmute" => {
                let hint = "/unmute <chat_id> <user_id>";
                Ok(Self::Unmute {
                    chat_id: id(0, hint)?,
                    user_id: id(1, hint)?,
                })
            }
            "/target" => Ok(Self::Target {
                chat_id: id(0, "/target <chat_id>")?,
            }),
            "/stop" => Ok(Self::Stop),
            "/clear" => Ok(Self::Clear),
            other => Err(Error::InvalidCommand(format!(
                "Unknown command {}. Send /start for help.",
                other
            ))),
        }
    }
}

/// Handle a private message from an operator: a command, or content to relay
pub async fn handle_private_message(data: &Arc<Data>, message: &Message) -> Result<(), Error> {
    let Some(operator) = message.from.as_ref() else {
        return Ok(());
    };
    if !data.settings.is_admin(operator.id) {
        return Ok(());
    }

    let chat_id = message.chat.id;

    if message.is_command() {
        let text = message.text.as_deref().unwrap_or_default();
        let reply = match OperatorCommand::parse(text) {
            Ok(command) => run_command(data, operator.id, command).await?,
            Err(e) => e.to_string(),
        };
        return data.messenger.send_text(chat_id, &reply, None).await;
    }

    let Some(target) = data.relay_target(operator.id) else {
        return Ok(());
    };

    let reply = match OutboundPayload::from_message(message) {
        Some(payload) => match data.messenger.send_payload(target, &payload).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                warn!("Failed to relay to chat {}: {}", target, e);
                describe_relay_error(&e)
            }
        },
        None => "⚠️ This message type isn't supported.".to_string(),
    };

    data.messenger.send_text(chat_id, &reply, None).await
}

async fn run_command(
    data: &Arc<Data>,
    operator_id: i64,
    command: OperatorCommand,
) -> Result<String, Error> {
    let reply = match command {
        OperatorCommand::Start => help_text(data),
        OperatorCommand::Groups => list_groups(data).await,
        OperatorCommand::Users { chat_id } => list_users(data, chat_id).await,
        OperatorCommand::Mutes => list_mutes(data).await,
        OperatorCommand::Mute {
            chat_id,
            user_id,
            seconds,
        } => {
            if user_id == operator_id || user_id == data.bot_user_id {
                return Ok("❌ You can't mute yourself or the bot.".to_string());
            }
            let name = display_name(data, chat_id, user_id).await;
            mute_service::mute_user(data, ChatUser::new(chat_id, user_id), seconds).await;
            info!(
                "Operator {} muted {} in chat {} for {}s",
                operator_id, user_id, chat_id, seconds
            );
            format!(
                "✅ {} is invisibly muted for {}.\nLift it with /unmute {} {}",
                name,
                format_mute_duration(seconds),
                chat_id,
                user_id
            )
        }
        OperatorCommand::Unmute { chat_id, user_id } => {
            if mute_service::unmute_user(data, ChatUser::new(chat_id, user_id)).await {
                "🔓 Mute lifted!".to_string()
            } else {
                "ℹ️ That user isn't muted.".to_string()
            }
        }
        OperatorCommand::Target { chat_id } => {
            let chat = data.messenger.get_chat(chat_id).await;
            match chat {
                Ok(chat) if chat.kind.is_group() => {
                    data.set_relay_target(operator_id, chat_id);
                    format!(
                        "✏️ Relaying to {}. Everything you send here goes to the group. /stop to end.",
                        chat.display_title()
                    )
                }
                Ok(_) => "❌ That chat isn't a group.".to_string(),
                Err(e) => {
                    warn!("Target chat {} unavailable: {}", chat_id, e);
                    "❌ Group unavailable.".to_string()
                }
            }
        }
        OperatorCommand::Stop => match data.clear_relay_target(operator_id) {
            Some(_) => "🛑 Relay stopped.".to_string(),
            None => "ℹ️ Relay wasn't active.".to_string(),
        },
        OperatorCommand::Clear => {
            data.mutes.clear_all().await;
            data.users.clear_all().await;
            let cancelled = data.scheduler.cancel_where(|_| true);
            info!(
                "Operator {} cleared all stored state ({} pending replies cancelled)",
                operator_id, cancelled
            );
            "🧹 Mutes and user directory cleared.".to_string()
        }
    };

    Ok(reply)
}

fn help_text(data: &Arc<Data>) -> String {
    let mut text = String::from(
        "🛡️ Operator panel\n\n\
        /groups – groups the bot has seen\n\
        /users <chat_id> – users seen in a group\n\
        /mute <chat_id> <user_id> <seconds> – invisible mute\n\
        /unmute <chat_id> <user_id> – lift a mute\n\
        /mutes – active mutes\n\
        /target <chat_id> – relay your messages into a group\n\
        /stop – stop relaying\n\
        /clear – wipe stored mutes and users\n\n\
        Durations:",
    );
    for (label, seconds) in MUTE_DURATIONS {
        let _ = write!(text, " {} = {}s;", label, seconds);
    }
    if !data.replies.is_configured() {
        text.push_str("\n\nGenerator not configured, replies come from the local pools.");
    }
    text
}

async fn list_groups(data: &Arc<Data>) -> String {
    let mut lines = Vec::new();

    for chat_id in data.users.chats().await {
        match data.messenger.get_chat(chat_id).await {
            Ok(chat) if chat.kind.is_group() => {
                lines.push(format!("{} – {}", chat.display_title(), chat_id));
            }
            Ok(_) => {}
            Err(e) => {
                // Kicked, deleted or migrated: forget it
                warn!("Chat {} unavailable, dropping it: {}", chat_id, e);
                data.users.remove_chat(chat_id).await;
            }
        }
    }

    if lines.is_empty() {
        "📭 The bot isn't in any group yet.".to_string()
    } else {
        format!("👥 Groups:\n{}", lines.join("\n"))
    }
}

async fn list_users(data: &Arc<Data>, chat_id: i64) -> String {
    let users = data.users.users_in(chat_id).await;
    if users.is_empty() {
        return "📭 Nobody has written in that group yet.".to_string();
    }

    let lines: Vec<String> = users
        .iter()
        .map(|user| format!("{} – {}", user.display_name(), user.id))
        .collect();
    format!("👥 Users:\n{}", lines.join("\n"))
}

async fn list_mutes(data: &Arc<Data>) -> String {
    let now = now_epoch();
    let active = data.mutes.active(now).await;
    if active.is_empty() {
        return "🔈 Nobody is muted.".to_string();
    }

    let mut lines = Vec::with_capacity(active.len());
    for record in active {
        let name = display_name(data, record.key.chat_id, record.key.user_id).await;
        lines.push(format!(
            "{} in {} – {} left",
            name,
            record.key.chat_id,
            format_mute_duration(record.remaining_seconds(now).ceil() as u64)
        ));
    }
    format!("🔇 Muted:\n{}", lines.join("\n"))
}

async fn display_name(data: &Arc<Data>, chat_id: i64, user_id: i64) -> String {
    data.users
        .get(chat_id, user_id)
        .await
        .map(|user| user.display_name())
        .unwrap_or_else(|| format!("ID{}", user_id))
}

/// Turn a relay failure into something the operator can act on
pub fn describe_relay_error(error: &Error) -> String {
    let Error::Telegram {
        description,
        migrate_to_chat_id,
    } = error
    else {
        return format!("❌ Error: {}", truncate(&error.to_string(), 100));
    };

    let lower = description.to_lowercase();
    if let Some(new_id) = migrate_to_chat_id {
        format!(
            "❌ The group migrated. New id: {}. Pick it again with /target {}.",
            new_id, new_id
        )
    } else if lower.contains("upgraded") || lower.contains("migrated") {
        "❌ The group migrated. New id unknown, check /groups.".to_string()
    } else if lower.contains("bot is not a member") || lower.contains("chat not found") {
        "❌ The bot isn't in that group or the group is unavailable.".to_string()
    } else if lower.contains("can't send messages") || lower.contains("not enough rights") {
        "❌ The bot has no permission to send messages in that group.".to_string()
    } else if lower.contains("bot was blocked") || lower.contains("bot was kicked") {
        "❌ The bot was blocked in that group.".to_string()
    } else {
        format!("❌ Error: {}", truncate(description, 100))
    }
}
