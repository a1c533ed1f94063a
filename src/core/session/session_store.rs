// Per-chat session state.
//
// Each (channel, user) pair gets its own `SessionState`. State lives only in
// memory and is never shared between sessions. Handlers read a snapshot or
// apply a closure; no map guard is ever held across an `.await`.

use dashmap::DashMap;

use crate::core::planning::SheetRecord;

#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
pub struct SessionKey {
    pub channel_id: u64,
    pub user_id: u64,
}

impl SessionKey {
    pub fn new(channel_id: u64, user_id: u64) -> Self {
        Self {
            channel_id,
            user_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// The next free-text message is a new backlog entry.
    pub capture_mode: bool,
    /// Prompt of the last KPI analysis, for "continue".
    pub last_prompt: String,
    /// Everything answered so far for `last_prompt`.
    pub last_response: String,
    /// Last ranked focus list, indexed by the commitment buttons.
    pub last_focus: Vec<SheetRecord>,
}

pub struct SessionStore {
    sessions: DashMap<SessionKey, SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Copy of the session's state (default state for a new session).
    pub fn snapshot(&self, key: SessionKey) -> SessionState {
        self.sessions
            .get(&key)
            .map(|state| state.clone())
            .unwrap_or_default()
    }

    /// Applies `f` to the session's state and returns its result.
    pub fn update<R>(&self, key: SessionKey, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut entry = self.sessions.entry(key).or_default();
        f(entry.value_mut())
    }

    pub fn set_capture_mode(&self, key: SessionKey, enabled: bool) {
        self.update(key, |state| state.capture_mode = enabled);
    }

    /// Clears capture mode and reports whether it was set.
    pub fn take_capture_mode(&self, key: SessionKey) -> bool {
        match self.sessions.get_mut(&key) {
            Some(mut state) => std::mem::take(&mut state.capture_mode),
            None => false,
        }
    }

    pub fn remember_analysis(&self, key: SessionKey, prompt: String, response: String) {
        self.update(key, |state| {
            state.last_prompt = prompt;
            state.last_response = response;
        });
    }

    /// Appends a continuation to the stored analysis.
    pub fn extend_analysis(&self, key: SessionKey, continuation: &str) {
        self.update(key, |state| {
            if !state.last_response.is_empty() {
                state.last_response.push('\n');
            }
            state.last_response.push_str(continuation);
        });
    }

    pub fn remember_focus(&self, key: SessionKey, tasks: Vec<SheetRecord>) {
        self.update(key, |state| state.last_focus = tasks);
    }

    pub fn focus_task(&self, key: SessionKey, index: usize) -> Option<SheetRecord> {
        self.sessions
            .get(&key)
            .and_then(|state| state.last_focus.get(index).cloned())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
