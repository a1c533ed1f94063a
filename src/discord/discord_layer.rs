// Discord layer - commands and event handlers.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "flows/reply_flows.rs"]
pub mod flows;

#[path = "interactions/button_router.rs"]
pub mod interactions;

#[path = "messages/message_router.rs"]
pub mod messages;

// Re-export command types for convenience
pub use commands::assistant::{Context, Data, Error};
