use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::constants::timeouts::EXPIRY_TOLERANCE_SECONDS;
use crate::db::file;
use crate::db::models::{ChatUser, MuteRecord};

/// Two expiries closer than this are the same write (JSON float round-trips may drift by an ulp)
const SAME_EXPIRY_EPSILON: f64 = 1e-3;

/// Invisible mutes keyed by (chat, user), persisted as a whole map.
///
/// Every mutation locks the map, changes it and writes the full map back
/// before releasing the lock, so concurrent writers never interleave.
/// Records past their expiry are logically expired even if still present.
pub struct MuteStore {
    path: Option<PathBuf>,
    records: Mutex<HashMap<ChatUser, f64>>,
}

impl MuteStore {
    /// A store that never touches the disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Load the store from `path`; unreadable files start empty
    pub async fn load(path: PathBuf) -> Self {
        let raw: BTreeMap<String, f64> = file::load_map(&path).await;
        let mut records = HashMap::with_capacity(raw.len());

        for (key, expiry) in raw {
            match key.parse::<ChatUser>() {
                Ok(k) => {
                    records.insert(k, expiry);
                }
                Err(e) => warn!("Skipping mute record: {}", e),
            }
        }

        info!("Loaded {} mute records from {}", records.len(), path.display());

        Self {
            path: Some(path),
            records: Mutex::new(records),
        }
    }

    /// True iff a record exists and expires after `now`
    pub async fn is_muted(&self, key: ChatUser, now: f64) -> bool {
        self.records
            .lock()
            .await
            .get(&key)
            .map(|expiry| *expiry > now)
            .unwrap_or(false)
    }

    /// Stored expiry, whether or not it has passed
    pub async fn expiry_of(&self, key: ChatUser) -> Option<f64> {
        self.records.lock().await.get(&key).copied()
    }

    /// Mute `key` until `now + duration_seconds`, replacing any previous mute.
    /// Returns the new expiry.
    pub async fn set_mute(&self, key: ChatUser, duration_seconds: f64, now: f64) -> f64 {
        let expiry = now + duration_seconds;
        let mut records = self.records.lock().await;
        records.insert(key, expiry);
        self.persist(&records).await;
        expiry
    }

    /// Remove the mute for `key`. Returns whether one existed.
    pub async fn clear_mute(&self, key: ChatUser) -> bool {
        let mut records = self.records.lock().await;
        let existed = records.remove(&key).is_some();
        if existed {
            self.persist(&records).await;
        }
        existed
    }

    /// Compare-and-delete used by expiry timers: the record is removed only if it
    /// still carries `expected` and that expiry has (nearly) passed.
    /// A newer mute or a manual unmute is left untouched.
    pub async fn expire_if_unchanged(&self, key: ChatUser, expected: f64, now: f64) -> bool {
        let mut records = self.records.lock().await;

        let matches = match records.get(&key) {
            Some(current) => {
                (current - expected).abs() < SAME_EXPIRY_EPSILON
                    && now >= current - EXPIRY_TOLERANCE_SECONDS
            }
            None => false,
        };

        if matches {
            records.remove(&key);
            self.persist(&records).await;
        }
        matches
    }

    /// Drop every record already expired at `now`, returning the removed keys
    pub async fn sweep_expired(&self, now: f64) -> Vec<ChatUser> {
        let mut records = self.records.lock().await;
        let expired: Vec<ChatUser> = records
            .iter()
            .filter(|(_, expiry)| **expiry <= now)
            .map(|(key, _)| *key)
            .collect();

        if !expired.is_empty() {
            for key in &expired {
                records.remove(key);
            }
            self.persist(&records).await;
        }
        expired
    }

    /// Move every mute of chat `old` to chat `new` (group upgraded to supergroup).
    /// Returns the moved records under their new keys.
    pub async fn relocate_chat(&self, old: i64, new: i64) -> Vec<MuteRecord> {
        let mut records = self.records.lock().await;
        let stale: Vec<ChatUser> = records
            .keys()
            .filter(|key| key.chat_id == old)
            .copied()
            .collect();

        let mut moved = Vec::with_capacity(stale.len());
        for key in stale {
            if let Some(expiry) = records.remove(&key) {
                let relocated = ChatUser::new(new, key.user_id);
                records.insert(relocated, expiry);
                moved.push(MuteRecord {
                    key: relocated,
                    expires_at: expiry,
                });
            }
        }

        if !moved.is_empty() {
            self.persist(&records).await;
        }
        moved
    }

    /// Active mutes, soonest expiry first
    pub async fn active(&self, now: f64) -> Vec<MuteRecord> {
        let records = self.records.lock().await;
        let mut active: Vec<MuteRecord> = records
            .iter()
            .map(|(key, expiry)| MuteRecord {
                key: *key,
                expires_at: *expiry,
            })
            .filter(|record| record.is_active(now))
            .collect();
        active.sort_by(|a, b| a.expires_at.total_cmp(&b.expires_at));
        active
    }

    pub async fn clear_all(&self) {
        let mut records = self.records.lock().await;
        records.clear();
        if let Some(path) = &self.path {
            if let Err(e) = file::remove_file(path).await {
                error!("Failed to remove mute file: {}", e);
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    async fn persist(&self, records: &HashMap<ChatUser, f64>) {
        let Some(path) = &self.path else {
            return;
        };

        let serializable: BTreeMap<String, f64> = records
            .iter()
            .map(|(key, expiry)| (key.to_string(), *expiry))
            .collect();

        if let Err(e) = file::save_map(path, &serializable).await {
            error!("Failed to save mutes to {}: {}", path.display(), e);
        }
    }
}
