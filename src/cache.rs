use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::completion::Completer;
use crate::error::UpstreamError;

/// Key-value store for answers, keyed by the exact input text.
pub trait AnswerStore: Send + Sync {
    fn get(&self, input: &str) -> Option<String>;
    fn put(&self, input: String, answer: String);
}

/// Lives as long as the Lambda instance. Empty after every cold start, never evicts.
#[derive(Default)]
pub struct InMemoryStore {
    answers: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.answers.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl AnswerStore for InMemoryStore {
    fn get(&self, input: &str) -> Option<String> {
        let answers = self.answers.lock().unwrap_or_else(|e| e.into_inner());
        answers.get(input).cloned()
    }

    fn put(&self, input: String, answer: String) {
        let mut answers = self.answers.lock().unwrap_or_else(|e| e.into_inner());
        answers.insert(input, answer);
    }
}

/// Answers from the store when possible, otherwise asks the completer and remembers the result.
///
/// The store is not locked across the completion call, so two concurrent misses for the
/// same input both reach the completer. Last write wins.
#[derive(Clone)]
pub struct CompletionCache {
    store: Arc<dyn AnswerStore>,
    completer: Arc<dyn Completer>,
}

impl CompletionCache {
    pub fn new(store: Arc<dyn AnswerStore>, completer: Arc<dyn Completer>) -> Self {
        Self { store, completer }
    }

    pub async fn lookup_or_compute(&self, input: &str) -> Result<String, UpstreamError> {
        if let Some(answer) = self.store.get(input) {
            info!("Cache hit ({} chars)", input.chars().count());
            return Ok(answer);
        }

        info!("Cache miss ({} chars), asking the completion API", input.chars().count());
        let answer = self.completer.complete(input).await?;
        self.store.put(input.to_string(), answer.clone());
        Ok(answer)
    }
}
