use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::error::UpstreamError;
use crate::types::{ChatMessage, ChatRequest, ChatResponse};

/// Role of the single message sent per request. No history is ever attached.
const PROMPT_ROLE: &str = "assistant";

#[async_trait]
pub trait Completer: Send + Sync {
    /// Sends `input` as a single-turn prompt and returns the model's answer.
    async fn complete(&self, input: &str) -> Result<String, UpstreamError>;
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiCompleter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiCompleter {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String, model: String) -> Self {
        Self {
            client,
            api_key,
            base_url,
            model,
        }
    }

    fn request(&self, input: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: PROMPT_ROLE.to_string(),
                content: Some(input.to_string()),
            }],
        }
    }
}

#[async_trait]
impl Completer for OpenAiCompleter {
    async fn complete(&self, input: &str) -> Result<String, UpstreamError> {
        let now = std::time::Instant::now();
        let res = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request(input))
            .send()
            .await
            .map_err(|err| {
                error!("Failed to send request to the completion API: {err}");
                UpstreamError::Request(err)
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.json::<serde_json::Value>().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }

        let response = res.json::<ChatResponse>().await.map_err(|err| {
            error!("Failed to parse completion response: {err}");
            UpstreamError::Decode(err)
        })?;
        info!("Completion finished in {}ms", now.elapsed().as_millis());

        answer_from(response)
    }
}

/// Maps an error body like `{"error": {"code": ..., "message": ...}}` to an [`UpstreamError`].
fn api_error(status: u16, body: &serde_json::Value) -> UpstreamError {
    if status == 429 || body["error"]["code"] == "rate_limit_exceeded" {
        warn!("Rate limit reached for the completion API");
        return UpstreamError::RateLimited;
    }

    let message = body["error"]["message"]
        .as_str()
        .unwrap_or("unknown error")
        .to_string();
    error!("Completion API returned {status}: {message}");
    UpstreamError::Api { status, message }
}

/// The answer is the first choice's message content, verbatim. Anything else is an error.
fn answer_from(response: ChatResponse) -> Result<String, UpstreamError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or(UpstreamError::MissingAnswer)
}
