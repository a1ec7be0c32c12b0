use std::fmt;
use std::str::FromStr;

/// Composite (chat, user) key shared by the mute store and the reply scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatUser {
    pub chat_id: i64,
    pub user_id: i64,
}

impl ChatUser {
    pub fn new(chat_id: i64, user_id: i64) -> Self {
        Self { chat_id, user_id }
    }
}

/// Persisted as "{chat}:{user}"
impl fmt::Display for ChatUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chat_id, self.user_id)
    }
}

impl FromStr for ChatUser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chat, user) = s
            .split_once(':')
            .ok_or_else(|| format!("missing ':' in key {:?}", s))?;
        let chat_id = chat
            .trim()
            .parse()
            .map_err(|_| format!("bad chat id in key {:?}", s))?;
        let user_id = user
            .trim()
            .parse()
            .map_err(|_| format!("bad user id in key {:?}", s))?;
        Ok(Self { chat_id, user_id })
    }
}
