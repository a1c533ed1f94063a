use crate::core::ai::{
    models::{AiConfig, AiMessage},
    AiProvider,
};
use async_trait::async_trait;
use reqwest::Client;
use std::error::Error;

use super::completions::{chat_completion, ChatRequest};

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl AiProvider for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        config: &AiConfig,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let request = ChatRequest {
            url: OPENAI_URL,
            api_key: &self.api_key,
            model: &self.model,
            provider: "OpenAI",
        };
        chat_completion(&self.client, request, messages, config).await
    }
}
