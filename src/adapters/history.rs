use crate::config::DEFAULT_HISTORY_SESSIONS;
use crate::domain::model::PromptMessage;
use crate::domain::ports::MessageHistory;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Default)]
struct Session {
    log: VecDeque<PromptMessage>,
    last_used: u64,
}

#[derive(Default)]
struct Sessions {
    by_user: HashMap<String, Session>,
    clock: u64,
}

impl Sessions {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .by_user
            .iter()
            .min_by_key(|(_, session)| session.last_used)
            .map(|(user, _)| user.clone());
        if let Some(user) = oldest {
            tracing::debug!("Dropping chat history of least recently active session");
            self.by_user.remove(&user);
        }
    }
}

/// Process-local conversation log. Each session keeps at most
/// `max_messages` entries, oldest evicted first; at most `max_sessions`
/// sessions are kept, the least recently used dropped first.
pub struct InMemoryHistory {
    max_messages: usize,
    max_sessions: usize,
    sessions: Mutex<Sessions>,
}

impl InMemoryHistory {
    pub fn new(max_messages: usize) -> Self {
        Self::with_capacity(max_messages, DEFAULT_HISTORY_SESSIONS)
    }

    pub fn with_capacity(max_messages: usize, max_sessions: usize) -> Self {
        Self {
            max_messages,
            max_sessions,
            sessions: Mutex::new(Sessions::default()),
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .by_user
            .len()
    }
}

impl MessageHistory for InMemoryHistory {
    fn add_messages(&self, session: &str, messages: Vec<PromptMessage>) {
        if self.max_messages == 0 || self.max_sessions == 0 {
            return;
        }
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        if !sessions.by_user.contains_key(session) {
            while sessions.by_user.len() >= self.max_sessions {
                sessions.evict_least_recent();
            }
        }

        let now = sessions.tick();
        let entry = sessions.by_user.entry(session.to_string()).or_default();
        entry.last_used = now;
        entry.log.extend(messages);
        while entry.log.len() > self.max_messages {
            entry.log.pop_front();
        }
    }

    fn messages(&self, session: &str) -> Vec<PromptMessage> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let now = sessions.tick();
        match sessions.by_user.get_mut(session) {
            Some(entry) => {
                entry.last_used = now;
                entry.log.iter().cloned().collect()
            }
            None => Vec::new(),
        }
    }

    fn clear(&self, session: &str) {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.by_user.remove(session);
    }
}
