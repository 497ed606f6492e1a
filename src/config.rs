use std::env;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_WHISPER_MODEL: &str = "whisper-1";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} not set!")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub openai_api_key: String,
    pub base_url: String,
    pub model: String,
    pub whisper_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        Ok(Self {
            telegram_bot_token: required("TELEGRAM_BOT_TOKEN")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            base_url: get("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            whisper_model: get("WHISPER_MODEL")
                .unwrap_or_else(|| DEFAULT_WHISPER_MODEL.to_string()),
        })
    }
}
