use serde_json::{json, Value};

use crate::messaging::types::Message;

/// Content an operator can relay into a group, one variant per Bot API send method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundPayload {
    Text(String),
    Voice(String),
    Photo(String),
    Video(String),
    Document(String),
    Audio(String),
    Sticker(String),
}

impl OutboundPayload {
    /// Pick the payload carried by an inbound message, if its kind is supported.
    /// Photos use the largest size.
    pub fn from_message(message: &Message) -> Option<Self> {
        if let Some(text) = message.text.as_ref() {
            return Some(Self::Text(text.clone()));
        }
        if let Some(voice) = &message.voice {
            return Some(Self::Voice(voice.file_id.clone()));
        }
        if let Some(sizes) = &message.photo {
            if let Some(largest) = sizes
                .iter()
                .max_by_key(|p| u64::from(p.width) * u64::from(p.height))
            {
                return Some(Self::Photo(largest.file_id.clone()));
            }
        }
        if let Some(video) = &message.video {
            return Some(Self::Video(video.file_id.clone()));
        }
        if let Some(document) = &message.document {
            return Some(Self::Document(document.file_id.clone()));
        }
        if let Some(audio) = &message.audio {
            return Some(Self::Audio(audio.file_id.clone()));
        }
        if let Some(sticker) = &message.sticker {
            return Some(Self::Sticker(sticker.file_id.clone()));
        }
        None
    }

    /// Bot API method name
    pub fn method(&self) -> &'static str {
        match self {
            Self::Text(_) => "sendMessage",
            Self::Voice(_) => "sendVoice",
            Self::Photo(_) => "sendPhoto",
            Self::Video(_) => "sendVideo",
            Self::Document(_) => "sendDocument",
            Self::Audio(_) => "sendAudio",
            Self::Sticker(_) => "sendSticker",
        }
    }

    /// Request body for `chat_id`
    pub fn body(&self, chat_id: i64) -> Value {
        match self {
            Self::Text(text) => json!({ "chat_id": chat_id, "text": text }),
            Self::Voice(file_id) => json!({ "chat_id": chat_id, "voice": file_id }),
            Self::Photo(file_id) => json!({ "chat_id": chat_id, "photo": file_id }),
            Self::Video(file_id) => json!({ "chat_id": chat_id, "video": file_id }),
            Self::Document(file_id) => json!({ "chat_id": chat_id, "document": file_id }),
            Self::Audio(file_id) => json!({ "chat_id": chat_id, "audio": file_id }),
            Self::Sticker(file_id) => json!({ "chat_id": chat_id, "sticker": file_id }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(extra: &str) -> Message {
        let raw = format!(
            r#"{{"message_id": 1, "chat": {{"id": 9, "type": "private"}}{}}}"#,
            extra
        );
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_largest_photo_is_relayed() {
        let msg = message(
            r#", "photo": [
                {"file_id": "small", "width": 90, "height": 90},
                {"file_id": "big", "width": 1280, "height": 720}
            ]"#,
        );
        let payload = OutboundPayload::from_message(&msg).unwrap();
        assert_eq!(payload, OutboundPayload::Photo("big".into()));
        assert_eq!(payload.method(), "sendPhoto");
        assert_eq!(payload.body(-5)["photo"], "big");
    }

    #[test]
    fn test_text_wins_and_unsupported_is_none() {
        let msg = message(r#", "text": "hello""#);
        assert_eq!(
            OutboundPayload::from_message(&msg),
            Some(OutboundPayload::Text("hello".into()))
        );
        assert_eq!(OutboundPayload::from_message(&message("")), None);
    }
}
