use async_trait::async_trait;
use teloxide::{prelude::Requester, types::ChatAction, types::ChatId, Bot};

use crate::error::TransportError;
use crate::utils;

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends one Markdown reply to the chat.
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError>;
    async fn send_typing(&self, chat_id: ChatId) -> Result<(), TransportError>;
}

pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError> {
        utils::safe_send(&self.bot, chat_id, text).await?;
        Ok(())
    }

    async fn send_typing(&self, chat_id: ChatId) -> Result<(), TransportError> {
        self.bot.send_chat_action(chat_id, ChatAction::Typing).await?;
        Ok(())
    }
}
