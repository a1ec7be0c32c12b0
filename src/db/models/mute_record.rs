use crate::db::models::ChatUser;

/// An invisible mute: messages from `key` are deleted until `expires_at`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MuteRecord {
    pub key: ChatUser,
    /// Epoch seconds
    pub expires_at: f64,
}

impl MuteRecord {
    pub fn is_active(&self, now: f64) -> bool {
        self.expires_at > now
    }

    pub fn remaining_seconds(&self, now: f64) -> f64 {
        (self.expires_at - now).max(0.0)
    }
}
