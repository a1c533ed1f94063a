pub mod focus_service;

pub use focus_service::{commit_focus, task_title, CommitOutcome, COMMIT_DURATIONS};
