// Yandex SpeechKit short-audio recognition (synchronous v1 API).
//
// The request body is the raw OGG/Opus file, which is exactly what a voice
// note is, so no conversion is needed.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;

use crate::core::speech::{SpeechError, SpeechProvider};

const YANDEX_STT_URL: &str = "https://stt.api.cloud.yandex.net/speech/v1/stt:recognize";
pub const DEFAULT_LANGUAGE: &str = "ru-RU";

#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

pub struct YandexSpeechClient {
    client: Client,
    api_key: String,
    folder_id: String,
    language: String,
}

impl YandexSpeechClient {
    pub fn new(api_key: String, folder_id: String, language: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            folder_id,
            language: language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        }
    }
}

#[async_trait]
impl SpeechProvider for YandexSpeechClient {
    fn name(&self) -> &str {
        "yandex"
    }

    async fn transcribe(&self, audio_path: &Path) -> Result<String, SpeechError> {
        let audio = tokio::fs::read(audio_path).await?;

        let response = self
            .client
            .post(YANDEX_STT_URL)
            .header("Authorization", format!("Api-Key {}", self.api_key))
            .query(&[
                ("folderId", self.folder_id.as_str()),
                ("lang", self.language.as_str()),
            ])
            .body(audio)
            .send()
            .await
            .map_err(|e| SpeechError::Remote(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SpeechError::Remote(e.to_string()))?;
        if !status.is_success() {
            return Err(SpeechError::Remote(format!("HTTP {} - {}", status, text)));
        }

        parse_response(&text)
    }
}

fn parse_response(body: &str) -> Result<String, SpeechError> {
    let parsed: RecognitionResponse =
        serde_json::from_str(body).map_err(|e| SpeechError::Remote(e.to_string()))?;
    match (parsed.result, parsed.error_message) {
        (Some(result), _) => Ok(result),
        (None, Some(message)) => Err(SpeechError::Remote(message)),
        (None, None) => Err(SpeechError::Empty),
    }
}
