pub mod speech_service;

pub use speech_service::{is_warning, SpeechError, SpeechProvider, SpeechService};
