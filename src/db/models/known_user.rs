use serde::{Deserialize, Serialize};

/// A group member the bot has seen writing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
}

impl KnownUser {
    /// Full name if any, otherwise @username, otherwise the numeric id
    pub fn display_name(&self) -> String {
        let full_name = format!("{} {}", self.first_name, self.last_name);
        let full_name = full_name.trim();
        if !full_name.is_empty() {
            full_name.to_string()
        } else if !self.username.is_empty() {
            format!("@{}", self.username)
        } else {
            format!("ID{}", self.id)
        }
    }
}
