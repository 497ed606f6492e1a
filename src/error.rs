use thiserror::Error;

/// Which part of the pipeline failed. Drives the reply the user gets.
///
/// Transport failures have no entry: a malformed update has no chat to reply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Upstream,
    Transcription,
}

impl ErrorKind {
    /// The fixed, user-visible reply for each kind of failure.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::Upstream => "There was an exception handling your message :(",
            ErrorKind::Transcription => "Sorry, I couldn't understand your voice message :(",
        }
    }
}

// https://platform.openai.com/docs/guides/error-codes/api-errors
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to reach the completion API: {0}")]
    Request(#[from] reqwest::Error),
    #[error("failed to parse completion response: {0}")]
    Decode(reqwest::Error),
    #[error("rate limit reached")]
    RateLimited,
    #[error("completion API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("completion response has no answer")]
    MissingAnswer,
}

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("file can't be larger than {limit}MB (current size: {size}MB)")]
    FileTooLarge { size: u32, limit: u32 },
    #[error("failed to fetch the voice file: {0}")]
    Download(String),
    #[error("failed to reach the transcription API: {0}")]
    Request(#[from] reqwest::Error),
    #[error("transcription API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("no speech found in the voice message")]
    NoSpeech,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("expected a text body, got {0}")]
    UnexpectedBody(&'static str),
    #[error("malformed update: {0}")]
    MalformedUpdate(#[from] serde_json::Error),
    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

/// Anything that can go wrong between receiving an event and having an answer.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),
}

impl HandlerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HandlerError::Upstream(_) => ErrorKind::Upstream,
            HandlerError::Transcription(_) => ErrorKind::Transcription,
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}
