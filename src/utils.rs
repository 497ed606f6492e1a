use lambda_http::{Body, Request};
use teloxide::{
    payloads::{SendDocumentSetters, SendMessageSetters},
    prelude::Requester,
    types::{ChatId, InputFile, ParseMode, Update},
    ApiError, Bot, RequestError,
};
use tracing::{info, warn};

use crate::error::TransportError;

/// Telegram's limit for a single text message.
pub const MAX_MESSAGE_CHARS: usize = 4096;

pub fn parse_webhook(input: &Request) -> Result<Update, TransportError> {
    let body_str = match input.body() {
        Body::Text(text) => text.as_str(),
        Body::Binary(bytes) => {
            std::str::from_utf8(bytes).map_err(|_| TransportError::UnexpectedBody("non-UTF-8 binary"))?
        }
        _ => return Err(TransportError::UnexpectedBody("empty body")),
    };
    let update: Update = serde_json::from_str(body_str)?;
    Ok(update)
}

pub fn is_too_long(content: &str) -> bool {
    content.chars().count() > MAX_MESSAGE_CHARS
}

/// Sends `content` as one Markdown message.
///
/// Content over the message limit goes out as an `answer.txt` document instead, and a
/// message Telegram can't parse as Markdown is re-sent once as plain text.
pub async fn safe_send(bot: &Bot, chat_id: ChatId, content: &str) -> Result<(), RequestError> {
    if is_too_long(content) {
        info!("Content is too long, sending as a file instead of multiple messages");
        let file = InputFile::memory(content.as_bytes().to_vec()).file_name("answer.txt");
        bot.send_document(chat_id, file)
            .caption("The answer is too long. Here is the file:")
            .await?;
        return Ok(());
    }

    let sent = bot
        .send_message(chat_id, content)
        .parse_mode(ParseMode::Markdown)
        .await;

    match sent {
        Ok(_) => Ok(()),
        Err(RequestError::Api(ApiError::CantParseEntities(reason))) => {
            warn!("Telegram rejected Markdown ({reason}), sending as plain text");
            bot.send_message(chat_id, content).await?;
            Ok(())
        }
        Err(err) => Err(err),
    }
}
