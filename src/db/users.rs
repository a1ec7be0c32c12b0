use std::collections::BTreeMap;
use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::db::file;
use crate::db::models::KnownUser;

type ChatUsers = BTreeMap<i64, KnownUser>;

/// Directory of users seen per chat, used by the operator commands.
/// Persisted as a whole map: chat id -> user id -> user.
pub struct UserDirectory {
    path: Option<PathBuf>,
    chats: Mutex<BTreeMap<i64, ChatUsers>>,
}

impl UserDirectory {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            chats: Mutex::new(BTreeMap::new()),
        }
    }

    pub async fn load(path: PathBuf) -> Self {
        let raw: BTreeMap<String, BTreeMap<String, KnownUser>> = file::load_map(&path).await;
        let mut chats = BTreeMap::new();

        for (chat_key, users) in raw {
            let Ok(chat_id) = chat_key.parse::<i64>() else {
                warn!("Skipping user directory entry with bad chat id {:?}", chat_key);
                continue;
            };
            let users: ChatUsers = users
                .into_iter()
                .filter_map(|(user_key, user)| user_key.parse().ok().map(|id| (id, user)))
                .collect();
            chats.insert(chat_id, users);
        }

        info!("Loaded user directory with {} chats from {}", chats.len(), path.display());

        Self {
            path: Some(path),
            chats: Mutex::new(chats),
        }
    }

    /// Insert or refresh a user in a chat
    pub async fn record(&self, chat_id: i64, user: KnownUser) {
        let mut chats = self.chats.lock().await;
        let users = chats.entry(chat_id).or_default();

        // Skip the write when nothing changed
        if users.get(&user.id) == Some(&user) {
            return;
        }
        users.insert(user.id, user);
        self.persist(&chats).await;
    }

    pub async fn get(&self, chat_id: i64, user_id: i64) -> Option<KnownUser> {
        self.chats
            .lock()
            .await
            .get(&chat_id)
            .and_then(|users| users.get(&user_id))
            .cloned()
    }

    pub async fn users_in(&self, chat_id: i64) -> Vec<KnownUser> {
        self.chats
            .lock()
            .await
            .get(&chat_id)
            .map(|users| users.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Every chat the bot has seen a message in
    pub async fn chats(&self) -> Vec<i64> {
        self.chats.lock().await.keys().copied().collect()
    }

    pub async fn remove_chat(&self, chat_id: i64) -> bool {
        let mut chats = self.chats.lock().await;
        let existed = chats.remove(&chat_id).is_some();
        if existed {
            self.persist(&chats).await;
        }
        existed
    }

    /// Move a chat's users under its new id (group upgraded to supergroup)
    pub async fn relocate_chat(&self, old: i64, new: i64) -> bool {
        let mut chats = self.chats.lock().await;
        let Some(users) = chats.remove(&old) else {
            return false;
        };
        chats.entry(new).or_default().extend(users);
        self.persist(&chats).await;
        true
    }

    pub async fn clear_all(&self) {
        let mut chats = self.chats.lock().await;
        chats.clear();
        if let Some(path) = &self.path {
            if let Err(e) = file::remove_file(path).await {
                error!("Failed to remove user directory file: {}", e);
            }
        }
    }

    async fn persist(&self, chats: &BTreeMap<i64, ChatUsers>) {
        let Some(path) = &self.path else {
            return;
        };

        let serializable: BTreeMap<String, BTreeMap<String, KnownUser>> = chats
            .iter()
            .map(|(chat_id, users)| {
                let users = users
                    .iter()
                    .map(|(id, user)| (id.to_string(), user.clone()))
                    .collect();
                (chat_id.to_string(), users)
            })
            .collect();

        if let Err(e) = file::save_map(path, &serializable).await {
            error!("Failed to save user directory to {}: {}", path.display(), e);
        }
    }
}
