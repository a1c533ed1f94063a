pub mod openai_transcriber;
pub mod yandex_client;

pub use openai_transcriber::OpenAiTranscriber;
pub use yandex_client::YandexSpeechClient;
