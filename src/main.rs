use std::sync::Arc;

use anyhow::Context;
use lambda_http::{run, service_fn, Error, Request, Response};
use teloxide::Bot;
use tracing::{debug, error, info};
use tracing_subscriber::fmt;

use cache::{CompletionCache, InMemoryStore};
use completion::OpenAiCompleter;
use config::Config;
use router::{EventHandler, Router};
use telegram::{ChatTransport, TelegramTransport};
use transcribe::WhisperTranscriber;
use types::ChatEvent;
use typing::with_typing;

mod cache;
mod completion;
mod config;
mod error;
mod router;
mod telegram;
#[cfg(test)]
mod testing;
mod transcribe;
mod types;
mod typing;
mod utils;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing for logging
    fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        // CloudWatch adds the ingestion time
        .without_time()
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    // Setup telegram bot (we do it here because this place is a cold start)
    let bot = Bot::new(config.telegram_bot_token.clone());

    let http = reqwest::Client::new();
    let transport: Arc<dyn ChatTransport> = Arc::new(TelegramTransport::new(bot.clone()));
    let transcriber = Arc::new(WhisperTranscriber::new(
        bot,
        http.clone(),
        config.openai_api_key.clone(),
        config.base_url.clone(),
        config.whisper_model.clone(),
    ));
    let completer = Arc::new(OpenAiCompleter::new(
        http,
        config.openai_api_key.clone(),
        config.base_url.clone(),
        config.model.clone(),
    ));

    // The store survives between invocations of a warm instance only
    let answers = CompletionCache::new(Arc::new(InMemoryStore::new()), completer);
    let router = Router::new(transport.clone(), transcriber, answers);
    let handler = with_typing(transport, router);

    // Run the Lambda function
    run(service_fn(|req| handle_request(req, &handler))).await
}

/// One webhook call. Every decodable update gets a 200, even when answering it failed,
/// otherwise Telegram keeps re-sending the same update.
async fn handle_request<H: EventHandler>(req: Request, handler: &H) -> Result<Response<String>, Error> {
    let update = match utils::parse_webhook(&req) {
        Ok(update) => update,
        Err(e) => {
            error!("Failed to parse webhook: {:?}", e);
            return Ok(Response::builder()
                .status(500)
                .body("Failed to parse webhook".into())?);
        }
    };

    match ChatEvent::from_update(update) {
        Some(event) => {
            let outcome = handler.handle(event).await;
            info!("Handled message: {:?}", outcome);
        }
        None => debug!("Received an update without text or voice"),
    }

    Ok(Response::builder().status(200).body(String::new())?)
}
