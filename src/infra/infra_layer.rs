// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "google/mod.rs"]
pub mod google;

#[path = "ai/mod.rs"]
pub mod ai;

#[path = "speech/mod.rs"]
pub mod speech;
