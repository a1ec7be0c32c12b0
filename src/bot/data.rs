use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;

use crate::config::Settings;
use crate::db::models::ChatUser;
use crate::db::{MuteStore, UserDirectory};
use crate::messaging::Messenger;
use crate::services::generator::{GroqClient, ReplyGenerator, SafeReplyGenerator};
use crate::services::scheduler::DebounceScheduler;

/// Shared state available to all handlers and services
pub struct Data {
    pub settings: Settings,
    /// Id of the bot account, so it never moderates itself
    pub bot_user_id: i64,
    pub messenger: Arc<dyn Messenger>,
    pub mutes: MuteStore,
    pub users: UserDirectory,
    /// Pending delayed replies, one per (chat, user)
    pub scheduler: DebounceScheduler<ChatUser>,
    pub replies: SafeReplyGenerator,
    /// Operator id -> chat their private messages are relayed to
    pub relay_targets: DashMap<i64, i64>,
}

impl Data {
    pub fn new(
        settings: Settings,
        bot_user_id: i64,
        messenger: Arc<dyn Messenger>,
        generator: Option<Arc<dyn ReplyGenerator>>,
        mutes: MuteStore,
        users: UserDirectory,
    ) -> Self {
        let replies = SafeReplyGenerator::new(generator, settings.generation_timeout);
        Self {
            settings,
            bot_user_id,
            messenger,
            mutes,
            users,
            scheduler: DebounceScheduler::new(),
            replies,
            relay_targets: DashMap::new(),
        }
    }

    /// Load the stores from disk and wire the generator from settings
    pub async fn load(settings: Settings, bot_user_id: i64, messenger: Arc<dyn Messenger>) -> Self {
        let mutes = MuteStore::load(settings.muted_file.clone()).await;
        let users = UserDirectory::load(settings.users_file.clone()).await;

        let generator: Option<Arc<dyn ReplyGenerator>> =
            settings.groq_api_key.as_deref().map(|key| {
                Arc::new(GroqClient::new(key, &settings.groq_api_base, &settings.groq_model))
                    as Arc<dyn ReplyGenerator>
            });

        if generator.is_none() {
            info!("GROQ_API_KEY not set, replies come from the local pools only");
        }

        Self::new(settings, bot_user_id, messenger, generator, mutes, users)
    }

    /// Set the relay target for an operator
    pub fn set_relay_target(&self, operator_id: i64, chat_id: i64) {
        self.relay_targets.insert(operator_id, chat_id);
    }

    /// Clear the relay target, returning the previous one
    pub fn clear_relay_target(&self, operator_id: i64) -> Option<i64> {
        self.relay_targets.remove(&operator_id).map(|(_, chat)| chat)
    }

    pub fn relay_target(&self, operator_id: i64) -> Option<i64> {
        self.relay_targets.get(&operator_id).map(|r| *r)
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("bot_user_id", &self.bot_user_id)
            .field("pending_replies", &self.scheduler.pending_count())
            .field("relay_targets", &self.relay_targets.len())
            .finish_non_exhaustive()
    }
}
