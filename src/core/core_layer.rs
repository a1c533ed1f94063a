// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "config/settings.rs"]
pub mod config;

#[path = "planning/mod.rs"]
pub mod planning;

#[path = "backlog/mod.rs"]
pub mod backlog;

#[path = "calendar/mod.rs"]
pub mod calendar;

#[path = "ai/mod.rs"]
pub mod ai;

#[path = "speech/mod.rs"]
pub mod speech;

#[path = "session/mod.rs"]
pub mod session;

#[path = "focus/mod.rs"]
pub mod focus;
