//! Process-lifetime bearer token registry. Restarting the process logs everyone out.

use dashmap::DashMap;
use domains::ports::SessionStore;

#[derive(Default)]
pub struct InMemorySessionStore {
    tokens: DashMap<String, i64>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl SessionStore for InMemorySessionStore {
    fn put(&self, token: String, user_id: i64) {
        self.tokens.insert(token, user_id);
    }

    fn get(&self, token: &str) -> Option<i64> {
        self.tokens.get(token).map(|entry| *entry.value())
    }

    fn invalidate(&self, token: &str) -> bool {
        self.tokens.remove(token).is_some()
    }

    fn invalidate_user(&self, user_id: i64) -> usize {
        let before = self.tokens.len();
        self.tokens.retain(|_, uid| *uid != user_id);
        let removed = before.saturating_sub(self.tokens.len());
        if removed > 0 {
            tracing::debug!(user_id, removed, "sessions invalidated");
        }
        removed
    }
}
