use std::sync::Arc;

use tracing::{error, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::config::Settings;
use crate::constants::timeouts::POLL_RETRY_DELAY;
use crate::handlers::event_handler::event_handler;
use crate::messaging::types::{ChatKind, Update};
use crate::messaging::{Messenger, TelegramApi};
use crate::services::moderation::mute_service;

pub async fn run(settings: Settings) -> Result<(), Error> {
    let api = Arc::new(TelegramApi::new(&settings.bot_token));

    let bot_user_id = api.get_me().await?;
    info!("Bot connected as user {}", bot_user_id);

    let messenger: Arc<dyn Messenger> = api.clone();
    let data = Arc::new(Data::load(settings, bot_user_id, messenger).await);
    info!(
        "Loaded {} stored mutes, {} known chats",
        data.mutes.len().await,
        data.users.chats().await.len()
    );

    // Catches mutes whose timers were lost to a restart
    mute_service::spawn_expiry_sweeper(data.clone());
    info!("Started mute expiry sweeper");

    let mut offset = 0;
    info!("Polling for updates...");

    loop {
        match api.get_updates(offset).await {
            Ok(updates) => {
                offset = handle_batch(&data, updates, offset).await;
            }
            Err(e) => {
                error!("Failed to fetch updates: {}", e);
                tokio::time::sleep(POLL_RETRY_DELAY).await;
            }
        }
    }
}

/// Dispatch one `getUpdates` batch and return the next offset.
///
/// Group messages are moderated one after another in arrival order, so a burst
/// from one sender arms its reply against the last message of the burst.
/// Operator chats run on their own tasks; relaying media can be slow.
async fn handle_batch(data: &Arc<Data>, updates: Vec<Update>, mut offset: i64) -> i64 {
    for update in updates {
        offset = offset.max(update.update_id + 1);

        let private = update
            .message
            .as_ref()
            .is_some_and(|m| m.chat.kind == ChatKind::Private);

        if private {
            let data = data.clone();
            tokio::spawn(async move {
                event_handler(&data, update).await;
            });
        } else {
            event_handler(data, update).await;
        }
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::ChatUser;
    use crate::testing::{
        group_text, message, test_data, RecordingMessenger, ADMIN_ID, GROUP_ID, REACTIVE_ID,
    };
    use crate::utils::formatting::now_epoch;
    use std::time::Duration;

    fn update(update_id: i64, message: crate::messaging::types::Message) -> Update {
        Update {
            update_id,
            message: Some(message),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_burst_anchors_to_last_message() {
        let messenger = Arc::new(RecordingMessenger::new());
        let data = test_data(messenger.clone(), None);
        let key = ChatUser::new(GROUP_ID, REACTIVE_ID);

        let batch = (1..=4)
            .map(|id| update(10 + id, group_text(id, REACTIVE_ID, "again and again")))
            .collect();
        let offset = handle_batch(&data, batch, 0).await;

        assert_eq!(offset, 15);
        assert_eq!(data.scheduler.anchor_of(&key), Some(4));

        tokio::time::sleep(Duration::from_secs(6)).await;
        let texts = messenger.texts();
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].2, Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_runs_operator_commands() {
        let messenger = Arc::new(RecordingMessenger::new());
        let data = test_data(messenger.clone(), None);

        let command = message(
            ADMIN_ID,
            "private",
            1,
            ADMIN_ID,
            &format!(", \"text\": \"/mute {} 42 60\"", GROUP_ID),
        );
        let empty = Update {
            update_id: 8,
            message: None,
        };
        let offset = handle_batch(&data, vec![update(7, command), empty], 3).await;
        assert_eq!(offset, 9);

        // Let the spawned operator task run
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(data.mutes.is_muted(ChatUser::new(GROUP_ID, 42), now_epoch()).await);
    }
}
