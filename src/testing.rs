//! Fakes shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::config::Settings;
use crate::db::{MuteStore, UserDirectory};
use crate::messaging::types::{ChatInfo, ChatKind, Message};
use crate::messaging::{Messenger, OutboundPayload};
use crate::services::generator::ReplyGenerator;

pub const BOT_ID: i64 = 999;
pub const ADMIN_ID: i64 = 1;
pub const REACTIVE_ID: i64 = 100;
pub const GROUP_ID: i64 = -1001;

/// Everything the bot tried to do on the platform
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text {
        chat_id: i64,
        text: String,
        reply_to: Option<i64>,
    },
    Deleted {
        chat_id: i64,
        message_id: i64,
    },
    Payload {
        chat_id: i64,
        payload: OutboundPayload,
    },
}

#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    chats: Mutex<HashMap<i64, String>>,
    pub fail_deletes: AtomicBool,
    pub fail_sends: AtomicBool,
    pub fail_payloads: AtomicBool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chat(self, chat_id: i64, title: &str) -> Self {
        self.chats.lock().unwrap().insert(chat_id, title.to_string());
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<(i64, String, Option<i64>)> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text {
                    chat_id,
                    text,
                    reply_to,
                } => Some((chat_id, text, reply_to)),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<(i64, i64)> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Deleted {
                    chat_id,
                    message_id,
                } => Some((chat_id, message_id)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<(), Error> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(Error::telegram("Forbidden: bot was blocked", None));
        }
        self.sent.lock().unwrap().push(Sent::Text {
            chat_id,
            text: text.to_string(),
            reply_to,
        });
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), Error> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Error::telegram("Bad Request: message can't be deleted", None));
        }
        self.sent.lock().unwrap().push(Sent::Deleted {
            chat_id,
            message_id,
        });
        Ok(())
    }

    async fn send_payload(&self, chat_id: i64, payload: &OutboundPayload) -> Result<(), Error> {
        if self.fail_payloads.load(Ordering::SeqCst) {
            return Err(Error::telegram(
                "Bad Request: group chat was upgraded to a supergroup chat",
                Some(-100777),
            ));
        }
        self.sent.lock().unwrap().push(Sent::Payload {
            chat_id,
            payload: payload.clone(),
        });
        Ok(())
    }

    async fn get_chat(&self, chat_id: i64) -> Result<ChatInfo, Error> {
        match self.chats.lock().unwrap().get(&chat_id) {
            Some(title) => Ok(ChatInfo {
                id: chat_id,
                kind: ChatKind::Supergroup,
                title: Some(title.clone()),
            }),
            None => Err(Error::telegram("Bad Request: chat not found", None)),
        }
    }

    async fn get_me(&self) -> Result<i64, Error> {
        Ok(BOT_ID)
    }
}

/// One scripted generator answer
#[derive(Debug, Clone)]
pub enum Scripted {
    Text(String),
    Empty,
    Fail,
    Hang,
}

/// Generator replaying a fixed script; an exhausted script answers `None`
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Scripted>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReplyGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<Option<String>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Text(text)) => Ok(Some(text)),
            Some(Scripted::Empty) | None => Ok(None),
            Some(Scripted::Fail) => Err(Error::Generation("service unavailable".into())),
            Some(Scripted::Hang) => std::future::pending().await,
        }
    }
}

pub fn test_settings() -> Settings {
    Settings {
        bot_token: "test-token".into(),
        admin_user_ids: vec![ADMIN_ID],
        reactive_user_ids: vec![REACTIVE_ID],
        groq_api_key: None,
        groq_model: "test-model".into(),
        groq_api_base: "http://localhost".into(),
        users_file: "unused-users.json".into(),
        muted_file: "unused-mutes.json".into(),
        mute_reply_delay: Duration::from_secs(3),
        troll_short_delay: Duration::from_secs(5),
        troll_long_delay: Duration::from_secs(10),
        generation_timeout: Duration::from_secs(5),
    }
}

/// Shared state over in-memory stores
pub fn test_data(
    messenger: Arc<RecordingMessenger>,
    generator: Option<Arc<ScriptedGenerator>>,
) -> Arc<Data> {
    let generator = generator.map(|g| g as Arc<dyn ReplyGenerator>);
    Arc::new(Data::new(
        test_settings(),
        BOT_ID,
        messenger,
        generator,
        MuteStore::in_memory(),
        UserDirectory::in_memory(),
    ))
}

/// Build an inbound message from JSON fragments
pub fn message(chat_id: i64, chat_type: &str, message_id: i64, from: i64, extra: &str) -> Message {
    let raw = format!(
        r#"{{
            "message_id": {},
            "chat": {{"id": {}, "type": "{}", "title": "Test"}},
            "from": {{"id": {}, "is_bot": false, "first_name": "User{}"}}
            {}
        }}"#,
        message_id, chat_id, chat_type, from, from, extra
    );
    serde_json::from_str(&raw).expect("valid test message")
}

pub fn group_text(message_id: i64, from: i64, text: &str) -> Message {
    message(
        GROUP_ID,
        "supergroup",
        message_id,
        from,
        &format!(", \"text\": {}", serde_json::to_string(text).unwrap()),
    )
}
