use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;

use crate::core::speech::{SpeechError, SpeechProvider};

const TRANSCRIPTION_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "gpt-4o-mini-transcribe";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

pub struct OpenAiTranscriber {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiTranscriber {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
        }
    }
}

#[async_trait]
impl SpeechProvider for OpenAiTranscriber {
    fn name(&self) -> &str {
        "openai"
    }

    async fn transcribe(&self, audio_path: &Path) -> Result<String, SpeechError> {
        let audio = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("voice.ogg")
            .to_string();

        let form = Form::new()
            .text("model", self.model.clone())
            .part("file", Part::bytes(audio).file_name(file_name));

        let response = self
            .client
            .post(TRANSCRIPTION_URL)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SpeechError::Remote(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SpeechError::Remote(format!("HTTP {} - {}", status, text)));
        }

        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::Remote(e.to_string()))?;
        Ok(body.text)
    }
}
