// Speech-to-text over an ordered list of providers.
//
// Voice notes are tried against each configured provider in turn; the first
// non-empty transcript wins. When nothing works the user gets a warning
// string instead of an error, and the caller must not store it.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Prefix of every transcription result that is not a transcript.
pub const WARNING_MARKER: &str = "⚠️";

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("could not read audio: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Remote(String),
    #[error("empty transcript")]
    Empty,
}

#[async_trait]
pub trait SpeechProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Raw transcript of the audio file.
    async fn transcribe(&self, audio_path: &Path) -> Result<String, SpeechError>;
}

pub struct SpeechService {
    providers: Vec<Box<dyn SpeechProvider>>,
}

impl SpeechService {
    pub fn new(providers: Vec<Box<dyn SpeechProvider>>) -> Self {
        Self { providers }
    }

    /// Transcript of the audio file, or a string starting with
    /// [`WARNING_MARKER`] when every provider failed.
    pub async fn transcribe(&self, audio_path: &Path) -> String {
        if self.providers.is_empty() {
            return format!(
                "{} Could not recognize the voice message: no speech provider is configured. \
                 Set YANDEX_API_KEY / YANDEX_FOLDER_ID or OPENAI_API_KEY.",
                WARNING_MARKER
            );
        }

        let mut failures = Vec::new();
        for provider in &self.providers {
            let outcome = match provider.transcribe(audio_path).await {
                Ok(raw) => {
                    let text = clean_text(&raw);
                    if text.is_empty() {
                        Err(SpeechError::Empty)
                    } else {
                        Ok(text)
                    }
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(text) => {
                    tracing::info!(provider = provider.name(), "Voice message transcribed");
                    return text;
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Speech provider failed");
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }

        format!(
            "{} Could not recognize the voice message ({}). \
             Check YANDEX_API_KEY / YANDEX_FOLDER_ID or the OpenAI quota.",
            WARNING_MARKER,
            failures.join("; ")
        )
    }
}

pub fn is_warning(text: &str) -> bool {
    text.starts_with(WARNING_MARKER)
}

/// Tidies a raw transcript: collapses whitespace, capitalises the first
/// letter and makes sure the sentence ends with punctuation.
pub fn clean_text(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return collapsed;
    }

    let mut chars = collapsed.chars();
    let mut text = match chars.next() {
        Some(first) if first.is_alphabetic() => first.to_uppercase().chain(chars).collect(),
        _ => collapsed.clone(),
    };

    if !text.ends_with(['.', '!', '?', '…']) {
        text.push('.');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider {
        name: &'static str,
        result: Result<&'static str, &'static str>,
    }

    #[async_trait]
    impl SpeechProvider for FixedProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn transcribe(&self, _audio_path: &Path) -> Result<String, SpeechError> {
            self.result
                .map(str::to_string)
                .map_err(|e| SpeechError::Remote(e.to_string()))
        }
    }

    fn provider(
        name: &'static str,
        result: Result<&'static str, &'static str>,
    ) -> Box<dyn SpeechProvider> {
        Box::new(FixedProvider { name, result })
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  купить   картошку "), "Купить картошку.");
        assert_eq!(clean_text("done already!"), "Done already!");
        assert_eq!(clean_text("42 kegs"), "42 kegs.");
        assert_eq!(clean_text("   "), "");
    }

    #[tokio::test]
    async fn test_first_working_provider_wins() {
        let service = SpeechService::new(vec![
            provider("yandex", Err("401 unauthorized")),
            provider("openai", Ok("order more lemons")),
        ]);
        let text = service.transcribe(Path::new("voice.ogg")).await;
        assert_eq!(text, "Order more lemons.");
        assert!(!is_warning(&text));
    }

    #[tokio::test]
    async fn test_all_failures_become_warning() {
        let service = SpeechService::new(vec![
            provider("yandex", Err("bad folder")),
            provider("openai", Ok("   ")),
        ]);
        let text = service.transcribe(Path::new("voice.ogg")).await;
        assert!(is_warning(&text));
        assert!(text.contains("yandex: bad folder"));
        assert!(text.contains("openai: empty transcript"));
    }

    #[tokio::test]
    async fn test_no_providers_is_warning() {
        let text = SpeechService::new(vec![])
            .transcribe(Path::new("voice.ogg"))
            .await;
        assert!(is_warning(&text));
    }
}
