use super::models::{AiConfig, AiMessage, ProviderFailure};
use async_trait::async_trait;
use std::error::Error;
use thiserror::Error as ThisError;

#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Short name used in logs and failure messages.
    fn name(&self) -> &str;

    /// Sends a chat completion request and returns the answer text.
    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        config: &AiConfig,
    ) -> Result<String, Box<dyn Error + Send + Sync>>;
}

// Blanket implementation for Box<dyn AiProvider>
// This lets the service hold a list of different providers (OpenAI,
// OpenRouter, ...) and try them in order.
#[async_trait]
impl AiProvider for Box<dyn AiProvider> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        config: &AiConfig,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        (**self).chat_complete(messages, config).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum AiError {
    #[error("no AI provider is configured")]
    NoProviders,
    #[error("{}", describe_failures(.0))]
    AllFailed(Vec<ProviderFailure>),
}

fn describe_failures(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.provider, f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Ordered fallback chain of chat providers. The first provider that returns
/// a non-empty answer wins.
pub struct AiService {
    providers: Vec<Box<dyn AiProvider>>,
}

impl AiService {
    pub fn new(providers: Vec<Box<dyn AiProvider>>) -> Self {
        Self { providers }
    }

    pub fn is_configured(&self) -> bool {
        !self.providers.is_empty()
    }

    pub async fn chat(&self, messages: &[AiMessage], config: &AiConfig) -> Result<String, AiError> {
        if self.providers.is_empty() {
            return Err(AiError::NoProviders);
        }

        let mut failures = Vec::new();
        for provider in &self.providers {
            match provider.chat_complete(messages, config).await {
                Ok(answer) if !answer.trim().is_empty() => {
                    tracing::debug!(provider = provider.name(), "AI provider answered");
                    return Ok(answer.trim().to_string());
                }
                Ok(_) => failures.push(ProviderFailure {
                    provider: provider.name().to_string(),
                    reason: "empty response".to_string(),
                }),
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "AI provider failed");
                    failures.push(ProviderFailure {
                        provider: provider.name().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(AiError::AllFailed(failures))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Provider returning a canned answer (or error) and counting calls.
    pub(crate) struct ScriptedProvider {
        pub name: &'static str,
        pub answer: Result<&'static str, &'static str>,
        pub calls: Arc<AtomicUsize>,
        pub seen: Arc<std::sync::Mutex<Vec<Vec<AiMessage>>>>,
    }

    impl ScriptedProvider {
        pub(crate) fn new(name: &'static str, answer: Result<&'static str, &'static str>) -> Self {
            Self {
                name,
                answer,
                calls: Arc::new(AtomicUsize::new(0)),
                seen: Arc::new(std::sync::Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl AiProvider for ScriptedProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn chat_complete(
            &self,
            messages: &[AiMessage],
            _config: &AiConfig,
        ) -> Result<String, Box<dyn Error + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(messages.to_vec());
            match self.answer {
                Ok(text) => Ok(text.to_string()),
                Err(reason) => Err(reason.into()),
            }
        }
    }

    fn config() -> AiConfig {
        AiConfig {
            temperature: 0.5,
            max_tokens: Some(100),
        }
    }

    #[tokio::test]
    async fn test_no_providers() {
        let service = AiService::new(vec![]);
        assert!(!service.is_configured());
        assert_eq!(
            service.chat(&[AiMessage::user("hi")], &config()).await,
            Err(AiError::NoProviders)
        );
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let second = ScriptedProvider::new("second", Ok("unused"));
        let second_calls = Arc::clone(&second.calls);
        let service = AiService::new(vec![
            Box::new(ScriptedProvider::new("first", Ok("  answer  "))),
            Box::new(second),
        ]);

        let answer = service.chat(&[AiMessage::user("hi")], &config()).await;
        assert_eq!(answer, Ok("answer".to_string()));
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_and_aggregates() {
        let service = AiService::new(vec![
            Box::new(ScriptedProvider::new("openai", Err("quota exceeded"))),
            Box::new(ScriptedProvider::new("openrouter", Ok("fallback answer"))),
        ]);
        assert_eq!(
            service.chat(&[AiMessage::user("hi")], &config()).await,
            Ok("fallback answer".to_string())
        );

        let failing = AiService::new(vec![
            Box::new(ScriptedProvider::new("openai", Err("quota exceeded"))),
            Box::new(ScriptedProvider::new("openrouter", Ok("   "))),
        ]);
        let err = failing
            .chat(&[AiMessage::user("hi")], &config())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "openai: quota exceeded; openrouter: empty response"
        );
    }
}
