use async_trait::async_trait;
use teloxide::{net::Download, prelude::Requester, Bot};
use tracing::{error, info};

use crate::error::TranscriptionError;
use crate::types::{VoiceRef, WhisperResponse};

const MAX_FILE_SIZE: u32 = 25; // in MB (whisper limit)

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Fetches the referenced voice file and returns what was said in it.
    async fn transcribe(&self, voice: &VoiceRef) -> Result<String, TranscriptionError>;
}

/// Downloads voice messages through the Bot API and sends them to `/audio/transcriptions`.
pub struct WhisperTranscriber {
    bot: Bot,
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl WhisperTranscriber {
    pub fn new(
        bot: Bot,
        client: reqwest::Client,
        api_key: String,
        base_url: String,
        model: String,
    ) -> Self {
        Self {
            bot,
            client,
            api_key,
            base_url,
            model,
        }
    }

    async fn download(&self, voice: &VoiceRef) -> Result<Vec<u8>, TranscriptionError> {
        check_size(voice.size)?;

        let file = self
            .bot
            .get_file(voice.file_id.clone())
            .await
            .map_err(|e| TranscriptionError::Download(e.to_string()))?;
        // the file size in the message can be missing, the resolved one is authoritative
        check_size(file.size)?;

        let mut audio_bytes = Vec::new();
        self.bot
            .download_file(&file.path, &mut audio_bytes)
            .await
            .map_err(|e| TranscriptionError::Download(e.to_string()))?;
        Ok(audio_bytes)
    }

    async fn upload(&self, audio_bytes: Vec<u8>, voice: &VoiceRef) -> Result<String, TranscriptionError> {
        let (mime, extension) = voice_format(voice);

        info!(
            "Transcribing audio! Duration: {} | Mime: {}",
            voice.duration, mime
        );
        let now = std::time::Instant::now();

        let part = reqwest::multipart::Part::bytes(audio_bytes)
            .file_name(format!("audio.{extension}"))
            .mime_str(mime)?;
        let form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "json")
            .part("file", part);

        let res = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|err| {
                error!("Failed to send request to the transcription API: {err}");
                TranscriptionError::Request(err)
            })?;

        let status = res.status();
        if !status.is_success() {
            let json = res.json::<serde_json::Value>().await.unwrap_or_default();
            let message = json["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            error!("Transcription API returned {status}: {message}");
            return Err(TranscriptionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let res = res.json::<WhisperResponse>().await?;
        info!("Transcribed audio in {}ms", now.elapsed().as_millis());

        transcript_from(res)
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, voice: &VoiceRef) -> Result<String, TranscriptionError> {
        let audio_bytes = self.download(voice).await?;
        self.upload(audio_bytes, voice).await
    }
}

fn check_size(size: u32) -> Result<(), TranscriptionError> {
    if size > MAX_FILE_SIZE * 1024 * 1024 {
        return Err(TranscriptionError::FileTooLarge {
            size: size / 1024 / 1024,
            limit: MAX_FILE_SIZE,
        });
    }
    Ok(())
}

/// Mime type and file extension for the upload. Whisper picks the decoder from the
/// extension, so anything it would not recognise is sent as OGG/Opus, which is what
/// Telegram voice notes are.
fn voice_format(voice: &VoiceRef) -> (&'static str, &'static str) {
    let Some(mime) = &voice.mime else {
        return ("audio/ogg", "ogg");
    };
    match mime.subtype().as_str() {
        "mpeg" | "mp3" => ("audio/mpeg", "mp3"),
        "mp4" | "m4a" | "x-m4a" => ("audio/mp4", "m4a"),
        "wav" | "wave" | "x-wav" => ("audio/wav", "wav"),
        "webm" => ("audio/webm", "webm"),
        "flac" | "x-flac" => ("audio/flac", "flac"),
        // ogg, oga, opus, x-opus+ogg and unknowns
        _ => ("audio/ogg", "ogg"),
    }
}

fn transcript_from(res: WhisperResponse) -> Result<String, TranscriptionError> {
    let text = res.text.trim();
    if text.is_empty() {
        return Err(TranscriptionError::NoSpeech);
    }
    Ok(text.to_string())
}
