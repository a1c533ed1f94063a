// Shared request for OpenAI-compatible `/chat/completions` endpoints.

use reqwest::Client;
use serde_json::json;
use std::error::Error;

use crate::core::ai::models::{AiConfig, AiMessage};

pub(crate) struct ChatRequest<'a> {
    pub url: &'a str,
    pub api_key: &'a str,
    pub model: &'a str,
    pub provider: &'a str,
}

pub(crate) async fn chat_completion(
    client: &Client,
    request: ChatRequest<'_>,
    messages: &[AiMessage],
    config: &AiConfig,
) -> Result<String, Box<dyn Error + Send + Sync>> {
    let payload = build_payload(request.model, messages, config);

    let response = client
        .post(request.url)
        .header("Authorization", format!("Bearer {}", request.api_key))
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await?;
        return Err(format!("{} API error: {} - {}", request.provider, status, text).into());
    }

    let response_json: serde_json::Value = response.json().await?;
    extract_content(&response_json)
}

fn build_payload(model: &str, messages: &[AiMessage], config: &AiConfig) -> serde_json::Value {
    let mut payload = json!({
        "model": model,
        "messages": messages,
        "temperature": config.temperature,
    });
    if let Some(max_tokens) = config.max_tokens {
        payload["max_tokens"] = json!(max_tokens);
    }
    payload
}

fn extract_content(
    response_json: &serde_json::Value,
) -> Result<String, Box<dyn Error + Send + Sync>> {
    let content = response_json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or("Failed to parse response content")?
        .trim()
        .to_string();
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let config = AiConfig {
            temperature: 0.5,
            max_tokens: Some(250),
        };
        let payload = build_payload(
            "gpt-4o-mini",
            &[AiMessage::user("hi"), AiMessage::assistant("hello")],
            &config,
        );

        assert_eq!(payload["model"], "gpt-4o-mini");
        assert_eq!(payload["messages"][1]["role"], "assistant");
        assert_eq!(payload["max_tokens"], 250);

        let unbounded = build_payload(
            "gpt-4o-mini",
            &[],
            &AiConfig {
                temperature: 0.5,
                max_tokens: None,
            },
        );
        assert!(unbounded.get("max_tokens").is_none());
    }

    #[test]
    fn test_extract_content() {
        let body = json!({ "choices": [{ "message": { "content": "  Check the stock first.\n" } }] });
        assert_eq!(extract_content(&body).unwrap(), "Check the stock first.");
        assert!(extract_content(&json!({ "error": "quota" })).is_err());
    }
}
