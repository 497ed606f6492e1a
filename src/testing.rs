//! Deterministic stand-ins for Telegram, the completion API and Whisper.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use teloxide::types::ChatId;
use teloxide::{ApiError, RequestError};

use crate::completion::Completer;
use crate::error::{TranscriptionError, TransportError, UpstreamError};
use crate::router::{EventHandler, Outcome};
use crate::telegram::ChatTransport;
use crate::transcribe::Transcriber;
use crate::types::{ChatEvent, VoiceRef};

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Typing(ChatId),
    Message(ChatId, String),
}

/// Records every outbound call, including the ones it was told to fail.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    fail_typing: AtomicBool,
    fail_messages: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_typing(&self) {
        self.fail_typing.store(true, Ordering::SeqCst);
    }

    pub fn fail_messages(&self) {
        self.fail_messages.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// What a send to a chat that blocked the bot comes back as.
    fn failure() -> TransportError {
        TransportError::Telegram(RequestError::Api(ApiError::BotBlocked))
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Message(chat_id, text.to_string()));
        if self.fail_messages.load(Ordering::SeqCst) {
            return Err(Self::failure());
        }
        Ok(())
    }

    async fn send_typing(&self, chat_id: ChatId) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(Sent::Typing(chat_id));
        if self.fail_typing.load(Ordering::SeqCst) {
            return Err(Self::failure());
        }
        Ok(())
    }
}

/// Answers every prompt with the same text, or fails every time.
pub struct FakeCompleter {
    answer: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeCompleter {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completer for FakeCompleter {
    async fn complete(&self, input: &str) -> Result<String, UpstreamError> {
        self.calls.lock().unwrap().push(input.to_string());
        self.answer.clone().ok_or(UpstreamError::MissingAnswer)
    }
}

/// Knows the transcript of a fixed set of audio fixtures, keyed by file id.
/// Any other file fails to download.
#[derive(Default)]
pub struct FakeTranscriber {
    fixtures: HashMap<String, String>,
    calls: AtomicUsize,
}

impl FakeTranscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fixture(mut self, file_id: &str, transcript: &str) -> Self {
        self.fixtures
            .insert(file_id.to_string(), transcript.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, voice: &VoiceRef) -> Result<String, TranscriptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fixtures
            .get(&voice.file_id)
            .cloned()
            .ok_or_else(|| TranscriptionError::Download(format!("no such file: {}", voice.file_id)))
    }
}

/// Collects the events that reach it.
#[derive(Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<ChatEvent>>,
}

impl RecordingHandler {
    pub fn events(&self) -> Vec<ChatEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn handle(&self, event: ChatEvent) -> Outcome {
        self.events.lock().unwrap().push(event);
        Outcome::Replied
    }
}
