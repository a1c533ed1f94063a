use crate::core::ai::{
    models::{AiConfig, AiMessage},
    AiProvider,
};
use async_trait::async_trait;
use reqwest::Client;
use std::error::Error;

use super::completions::{chat_completion, ChatRequest};

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_OPENROUTER_MODEL: &str = "openai/gpt-4o-mini";

pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenRouterClient {
    pub fn new(api_key: String, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_OPENROUTER_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl AiProvider for OpenRouterClient {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        config: &AiConfig,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let request = ChatRequest {
            url: OPENROUTER_URL,
            api_key: &self.api_key,
            model: &self.model,
            provider: "OpenRouter",
        };
        chat_completion(&self.client, request, messages, config).await
    }
}
