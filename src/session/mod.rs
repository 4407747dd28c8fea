//! Per-session state and the login gate.
//!
//! Each browser session owns one [`SessionState`]. The login check only
//! requires both fields to be non-empty; it gates the UI and nothing more.
//! There is no credential store, hashing or rate limiting.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::conversation::{Conversation, Message};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials. Please try again.")]
    InvalidCredentials,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    logged_in: bool,
    show_login: bool,
    username: String,
    conversation: Conversation,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            logged_in: false,
            show_login: true,
            username: String::new(),
            conversation: Conversation::new(),
        }
    }

    /// Accepts any non-empty username/password pair. On failure the state is
    /// left untouched and the login form stays visible.
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        self.logged_in = true;
        self.show_login = false;
        self.username = username.to_string();
        Ok(())
    }

    /// End the session; history goes with it.
    pub fn logout(&mut self) {
        *self = Self::new();
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn show_login(&self) -> bool {
        self.show_login
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub(crate) fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            logged_in: self.logged_in,
            show_login: self.show_login,
            username: self.username.clone(),
            messages: self.conversation.messages().to_vec(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// What the page needs to render a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub logged_in: bool,
    pub show_login: bool,
    pub username: String,
    pub messages: Vec<Message>,
}

pub type SharedSession = Arc<Mutex<SessionState>>;

/// Idle time after which a session is dropped.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

struct SessionEntry {
    session: SharedSession,
    last_seen: Instant,
}

/// Live sessions keyed by an opaque token.
///
/// The outer lock only guards the map. Each session has its own mutex, held
/// for the length of a turn, so one session's slow upstream call never
/// blocks another session. Sessions not touched for `ttl` are evicted, either
/// lazily on lookup or by [`SessionStore::spawn_sweeper`].
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Generate a fresh random token.
    pub fn new_token() -> String {
        Uuid::new_v4().to_string()
    }

    /// Live session for `token`; refreshes its idle timer. An expired
    /// session is removed and reported as absent.
    pub async fn get(&self, token: &str) -> Option<SharedSession> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        let expired = match sessions.get_mut(token) {
            Some(entry) if now.duration_since(entry.last_seen) < self.ttl => {
                entry.last_seen = now;
                return Some(entry.session.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            sessions.remove(token);
            tracing::debug!("session expired on lookup");
        }
        None
    }

    /// Register `state` under `token`, replacing any previous session.
    pub async fn insert(&self, token: &str, state: SessionState) -> SharedSession {
        let session = Arc::new(Mutex::new(state));
        let entry = SessionEntry {
            session: session.clone(),
            last_seen: Instant::now(),
        };
        self.sessions.write().await.insert(token.to_string(), entry);
        session
    }

    pub async fn remove(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Drop every session idle for longer than the TTL; returns how many.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.ttl);
        before - sessions.len()
    }

    /// Periodically purge idle sessions in the background.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = store.purge_expired().await;
                if evicted > 0 {
                    let live = store.len().await;
                    tracing::debug!(evicted, live, "evicted idle sessions");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = SessionState::new();
        assert!(!state.is_logged_in());
        assert!(state.show_login());
        assert_eq!(state.username(), "");
        assert!(state.conversation().is_empty());
    }

    #[test]
    fn test_login_requires_both_fields() {
        let mut state = SessionState::new();

        assert_eq!(state.login("", "x"), Err(AuthError::InvalidCredentials));
        assert_eq!(state.login("x", ""), Err(AuthError::InvalidCredentials));
        assert_eq!(state.login("", ""), Err(AuthError::InvalidCredentials));

        assert!(!state.is_logged_in());
        assert!(state.show_login());
        assert_eq!(state.username(), "");
    }

    #[test]
    fn test_login_success() {
        let mut state = SessionState::new();
        state.login("alice", "secret").unwrap();

        assert!(state.is_logged_in());
        assert!(!state.show_login());
        assert_eq!(state.username(), "alice");
    }

    #[test]
    fn test_failed_relogin_keeps_existing_login() {
        let mut state = SessionState::new();
        state.login("alice", "secret").unwrap();
        assert!(state.login("bob", "").is_err());
        assert_eq!(state.username(), "alice");
        assert!(state.is_logged_in());
    }

    #[test]
    fn test_logout_resets() {
        let mut state = SessionState::new();
        state.login("alice", "secret").unwrap();
        state.conversation_mut().push_turn("hi", "hello");

        state.logout();
        assert!(!state.is_logged_in());
        assert!(state.show_login());
        assert!(state.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_store_isolates_sessions() {
        let store = SessionStore::with_ttl(DEFAULT_SESSION_TTL);
        let a = store.insert("a", SessionState::new()).await;
        let b = store.insert("b", SessionState::new()).await;

        a.lock().await.login("alice", "pw").unwrap();
        a.lock().await.conversation_mut().push_turn("hi", "hello");

        let b = b.lock().await;
        assert!(!b.is_logged_in());
        assert!(b.conversation().is_empty());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_store_get_and_remove() {
        let store = SessionStore::with_ttl(DEFAULT_SESSION_TTL);
        let inserted = store.insert("tok", SessionState::new()).await;
        let fetched = store.get("tok").await.unwrap();
        assert!(Arc::ptr_eq(&inserted, &fetched));

        assert!(store.remove("tok").await);
        assert!(!store.remove("tok").await);
        assert!(store.get("tok").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_expires_on_lookup() {
        let store = SessionStore::with_ttl(Duration::from_secs(60));
        store.insert("idle", SessionState::new()).await;

        tokio::time::advance(Duration::from_secs(61)).await;

        assert!(store.get("idle").await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_refreshes_idle_timer() {
        let store = SessionStore::with_ttl(Duration::from_secs(60));
        store.insert("busy", SessionState::new()).await;

        tokio::time::advance(Duration::from_secs(45)).await;
        assert!(store.get("busy").await.is_some());

        tokio::time::advance(Duration::from_secs(45)).await;
        assert!(store.get("busy").await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_drops_only_idle_sessions() {
        let store = SessionStore::with_ttl(Duration::from_secs(60));
        for i in 0..100 {
            store.insert(&format!("old-{i}"), SessionState::new()).await;
        }

        tokio::time::advance(Duration::from_secs(30)).await;
        store.insert("fresh", SessionState::new()).await;
        tokio::time::advance(Duration::from_secs(31)).await;

        assert_eq!(store.purge_expired().await, 100);
        assert_eq!(store.len().await, 1);
        assert!(store.get("fresh").await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_in_background() {
        let store = SessionStore::with_ttl(Duration::from_secs(60));
        store.insert("gone", SessionState::new()).await;
        let sweeper = store.spawn_sweeper(Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(75)).await;

        assert_eq!(store.len().await, 0);
        sweeper.abort();
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(SessionStore::new_token(), SessionStore::new_token());
    }
}
