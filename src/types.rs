use mime::Mime;
use serde::{Deserialize, Serialize};
use teloxide::types::{ChatId, Message, Update, UpdateKind};

/// Reference to a voice message file on Telegram's side.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceRef {
    pub file_id: String,
    pub duration: u32,
    pub size: u32,
    pub mime: Option<Mime>,
}

impl VoiceRef {
    pub fn from_message(message: &Message) -> Option<Self> {
        let voice = message.voice()?;
        Some(Self {
            file_id: voice.file.id.clone(),
            duration: voice.duration.seconds(),
            size: voice.file.size,
            mime: voice.mime_type.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventContent {
    Text(String),
    Voice(VoiceRef),
}

/// One inbound user message, the unit of work for the router.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEvent {
    pub chat_id: ChatId,
    pub content: EventContent,
}

impl ChatEvent {
    pub fn text(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            content: EventContent::Text(text.into()),
        }
    }

    pub fn voice(chat_id: ChatId, voice: VoiceRef) -> Self {
        Self {
            chat_id,
            content: EventContent::Voice(voice),
        }
    }

    /// Returns `None` for updates the bot doesn't answer (edits, stickers, photos...).
    pub fn from_update(update: Update) -> Option<Self> {
        let UpdateKind::Message(message) = update.kind else {
            return None;
        };

        if let Some(text) = message.text() {
            return Some(Self::text(message.chat.id, text));
        }

        VoiceRef::from_message(&message).map(|voice| Self::voice(message.chat.id, voice))
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct WhisperResponse {
    pub text: String,
}
