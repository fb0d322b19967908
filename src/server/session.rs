use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use actix_web::{cookie::Cookie, HttpRequest};
use lru::LruCache;
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::studio::ViewState;

pub const SESSION_COOKIE: &str = "artbox_session";
pub const DEFAULT_SESSION_CAPACITY: usize = 1024;

/// One session's view state. Handlers hold the lock for the whole action,
/// remote calls included, so a session's actions run one after another.
pub type SessionSlot = Arc<AsyncMutex<ViewState>>;

/// Per-session slots, least recently used evicted past the capacity.
pub struct SessionStore {
    sessions: Mutex<LruCache<String, SessionSlot>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// The slot of a session that has already stored something.
    pub fn get(&self, id: &str) -> Option<SessionSlot> {
        self.sessions
            .lock()
            .ok()
            .and_then(|mut sessions| sessions.get(id).cloned())
    }

    /// The session's slot, created empty on first use.
    pub fn slot(&self, id: &str) -> SessionSlot {
        let Ok(mut sessions) = self.sessions.lock() else {
            return Arc::new(AsyncMutex::new(ViewState::default()));
        };
        if let Some(slot) = sessions.get(id) {
            return slot.clone();
        }
        let slot: SessionSlot = Arc::new(AsyncMutex::new(ViewState::default()));
        sessions.put(id.to_string(), slot.clone());
        slot
    }

    /// Copy of the session's current state, waiting for any running action.
    pub async fn snapshot(&self, id: &str) -> Option<ViewState> {
        let slot = self.get(id)?;
        let state = slot.lock().await.clone();
        Some(state)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The caller's session id, and whether it was just minted.
pub fn session_id(req: &HttpRequest) -> (String, bool) {
    match req.cookie(SESSION_COOKIE) {
        Some(cookie) if Uuid::parse_str(cookie.value()).is_ok() => {
            (cookie.value().to_string(), false)
        }
        _ => (Uuid::new_v4().to_string(), true),
    }
}

pub fn session_cookie(id: &str) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, id.to_string())
        .path("/")
        .http_only(true)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeneratedPrompt;

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        assert!(store.is_empty());

        let state = ViewState {
            prompt: Some(GeneratedPrompt::new("a quiet harbor")),
            ..Default::default()
        };
        *store.slot("a").lock().await = state.clone();

        assert_eq!(store.snapshot("a").await, Some(state));
        assert_eq!(store.snapshot("b").await, None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_is_bounded() {
        let store = SessionStore::with_capacity(10);
        for _ in 0..50 {
            store.slot(&Uuid::new_v4().to_string());
        }
        assert_eq!(store.len(), 10);
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let store = SessionStore::with_capacity(2);
        store.slot("a");
        store.slot("b");
        assert!(store.get("a").is_some());
        store.slot("c");
        assert!(store.get("a").is_some());
        assert!(store.get("b").is_none());
    }

    #[tokio::test]
    async fn test_slot_is_shared_between_handles() {
        let store = SessionStore::new();
        let first = store.slot("a");
        let second = store.slot("a");
        assert!(Arc::ptr_eq(&first, &second));
    }
}
