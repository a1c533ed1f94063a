pub mod advice_service;
pub mod ai_service;
pub mod models;

pub use advice_service::AdviceService;
pub use ai_service::{AiProvider, AiService};
