pub mod completions;
pub mod openai_client;
pub mod openrouter_client;

pub use openai_client::OpenAiClient;
pub use openrouter_client::OpenRouterClient;
