use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use uuid::Uuid;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "medscan_session";

/// Sessions kept before the oldest is evicted.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session store is unavailable")]
    Unavailable,
}

/// Per-visitor state. `logged_in` is the only thing the gate flips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub logged_in: bool,
    pub username: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            logged_in: false,
            username: None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory sessions. Nothing survives a restart; once `capacity` is
/// reached the oldest session is dropped to make room.
pub struct SessionStore {
    inner: RwLock<Sessions>,
    capacity: usize,
}

#[derive(Default)]
struct Sessions {
    by_id: HashMap<Uuid, Session>,
    // insertion order, oldest first
    order: VecDeque<Uuid>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Sessions::default()),
            capacity: capacity.max(1),
        }
    }

    /// Looks up the session named by a cookie value.
    pub fn get(&self, raw_id: &str) -> Option<Session> {
        let id = Uuid::parse_str(raw_id).ok()?;
        self.inner.read().ok()?.by_id.get(&id).cloned()
    }

    pub fn save(&self, session: Session) -> Result<(), SessionError> {
        let mut inner = self.inner.write().map_err(|_| SessionError::Unavailable)?;

        if !inner.by_id.contains_key(&session.id) {
            while inner.by_id.len() >= self.capacity {
                match inner.order.pop_front() {
                    Some(oldest) => {
                        inner.by_id.remove(&oldest);
                    }
                    None => break,
                }
            }
            inner.order.push_back(session.id);
        }

        inner.by_id.insert(session.id, session);
        Ok(())
    }

    pub fn remove(&self, raw_id: &str) -> Option<Session> {
        let id = Uuid::parse_str(raw_id).ok()?;
        let mut inner = self.inner.write().ok()?;
        let removed = inner.by_id.remove(&id)?;
        inner.order.retain(|existing| *existing != id);
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|s| s.by_id.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.inner.write();
            panic!("poisoning session store");
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sessions_start_logged_out() {
        let session = Session::new();
        assert!(!session.logged_in);
        assert!(session.username.is_none());
        assert_ne!(session.id, Session::new().id);
    }

    #[test]
    fn save_get_remove() {
        let store = SessionStore::new();
        let mut session = Session::new();
        session.logged_in = true;
        let key = session.id.to_string();

        store.save(session.clone()).unwrap();
        assert_eq!(store.get(&key), Some(session.clone()));
        assert_eq!(store.len(), 1);

        assert_eq!(store.remove(&key), Some(session));
        assert!(store.get(&key).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn resaving_keeps_one_entry() {
        let store = SessionStore::new();
        let mut session = Session::new();
        store.save(session.clone()).unwrap();
        session.logged_in = true;
        store.save(session.clone()).unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.get(&session.id.to_string()).unwrap().logged_in);
    }

    #[test]
    fn oldest_session_is_evicted_at_capacity() {
        let store = SessionStore::with_capacity(2);
        let first = Session::new();
        let second = Session::new();
        let third = Session::new();

        store.save(first.clone()).unwrap();
        store.save(second.clone()).unwrap();
        store.save(third.clone()).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.get(&first.id.to_string()).is_none());
        assert!(store.get(&second.id.to_string()).is_some());
        assert!(store.get(&third.id.to_string()).is_some());
    }

    #[test]
    fn removed_sessions_free_their_slot() {
        let store = SessionStore::with_capacity(2);
        let first = Session::new();
        let second = Session::new();
        store.save(first.clone()).unwrap();
        store.save(second.clone()).unwrap();
        store.remove(&second.id.to_string());

        let third = Session::new();
        store.save(third.clone()).unwrap();
        assert!(store.get(&first.id.to_string()).is_some());
        assert!(store.get(&third.id.to_string()).is_some());
    }

    #[test]
    fn poisoned_store_refuses_to_save() {
        let store = SessionStore::new();
        store.poison();

        assert_eq!(store.save(Session::new()), Err(SessionError::Unavailable));
        assert!(store.is_empty());
    }

    #[test]
    fn garbage_ids_are_ignored() {
        let store = SessionStore::new();
        assert!(store.get("not-a-uuid").is_none());
        assert!(store.remove("").is_none());
    }
}
