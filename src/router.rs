use std::sync::Arc;

use async_trait::async_trait;
use teloxide::types::ChatId;
use tracing::{error, info};

use crate::cache::CompletionCache;
use crate::error::HandlerError;
use crate::telegram::ChatTransport;
use crate::transcribe::Transcriber;
use crate::types::{ChatEvent, EventContent};

/// How handling one event ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Replied,
    /// An error reply was sent instead of an answer.
    Failed,
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: ChatEvent) -> Outcome;
}

/// Turns every chat event into exactly one reply to the chat it came from.
/// Slash text is not special: `/start` is a prompt like any other.
pub struct Router {
    transport: Arc<dyn ChatTransport>,
    transcriber: Arc<dyn Transcriber>,
    answers: CompletionCache,
}

impl Router {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        transcriber: Arc<dyn Transcriber>,
        answers: CompletionCache,
    ) -> Self {
        Self {
            transport,
            transcriber,
            answers,
        }
    }

    async fn input_text(&self, content: EventContent) -> Result<String, HandlerError> {
        match content {
            EventContent::Text(text) => Ok(text),
            EventContent::Voice(voice) => {
                info!("Received voice message!");
                Ok(self.transcriber.transcribe(&voice).await?)
            }
        }
    }

    async fn answer(&self, content: EventContent) -> Result<String, HandlerError> {
        let input = self.input_text(content).await?;
        Ok(self.answers.lookup_or_compute(&input).await?)
    }

    async fn reply(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.transport.send_message(chat_id, text).await {
            error!("Failed to send reply to chat {}: {e}", chat_id.0);
        }
    }
}

#[async_trait]
impl EventHandler for Router {
    async fn handle(&self, event: ChatEvent) -> Outcome {
        let ChatEvent { chat_id, content } = event;

        match self.answer(content).await {
            Ok(answer) => {
                self.reply(chat_id, &answer).await;
                Outcome::Replied
            }
            Err(e) => {
                error!("Failed to answer message in chat {}: {e}", chat_id.0);
                error!("debug: {e:?}");
                self.reply(chat_id, e.user_message()).await;
                Outcome::Failed
            }
        }
    }
}
