//! Server-side session storage for `actix-session`.
//!
//! The middleware owns the `sid` cookie: it signs and encrypts the session
//! key, ignores keys it did not issue, and asks the store for state. Handlers
//! take an `actix_session::Session` and read or write fields through it.

use std::collections::HashMap;
use std::sync::Arc;

use actix_session::config::BrowserSession;
use actix_session::storage::{LoadError, SaveError, SessionKey, SessionStore, UpdateError};
use actix_session::SessionMiddleware;
use actix_web::cookie::{time::Duration, Key};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use rand::RngCore;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::AuthConfig;

pub const SESSION_COOKIE: &str = "sid";
const SESSION_KEY_BYTES: usize = 48;

/// Field map as persisted by the middleware. Values are JSON documents.
pub type SessionState = HashMap<String, String>;

#[derive(Debug, Clone)]
struct Entry {
    state: SessionState,
    expires_at: DateTime<Utc>,
}

impl Entry {
    fn new(state: SessionState, ttl: &Duration) -> Self {
        Self {
            state,
            expires_at: Utc::now() + chrono::Duration::seconds(ttl.whole_seconds()),
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// In-process session store. Entries expire after the middleware's state TTL.
#[derive(Default, Clone)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live session keys.
    pub async fn keys(&self) -> Vec<String> {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub async fn get(&self, key: &str) -> Option<SessionState> {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.state.clone())
    }

    /// Drops every expired entry.
    pub async fn evict_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(now));
        before - sessions.len()
    }

    async fn insert(&self, key: String, state: SessionState, ttl: &Duration) {
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        sessions.retain(|_, entry| !entry.is_expired(now));
        sessions.insert(key, Entry::new(state, ttl));
    }
}

fn generate_session_key() -> Result<SessionKey, anyhow::Error> {
    let mut bytes = [0u8; SESSION_KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    SessionKey::try_from(URL_SAFE_NO_PAD.encode(bytes))
        .map_err(|e| anyhow::anyhow!("generated session key rejected: {e}"))
}

impl SessionStore for MemorySessionStore {
    async fn load(&self, session_key: &SessionKey) -> Result<Option<SessionState>, LoadError> {
        let key = session_key.as_ref();
        let now = Utc::now();

        let mut sessions = self.sessions.write().await;
        match sessions.get(key) {
            Some(entry) if entry.is_expired(now) => {
                debug!("Session expired, discarding state");
                sessions.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.state.clone())),
            None => Ok(None),
        }
    }

    async fn save(&self, session_state: SessionState, ttl: &Duration) -> Result<SessionKey, SaveError> {
        let session_key = generate_session_key().map_err(SaveError::Other)?;
        self.insert(session_key.as_ref().to_owned(), session_state, ttl).await;
        debug!("Created new session");
        Ok(session_key)
    }

    async fn update(
        &self,
        session_key: SessionKey,
        session_state: SessionState,
        ttl: &Duration,
    ) -> Result<SessionKey, UpdateError> {
        // A key this store never issued, or one that expired, is never adopted.
        if self.get(session_key.as_ref()).await.is_none() {
            let fresh = generate_session_key().map_err(UpdateError::Other)?;
            self.insert(fresh.as_ref().to_owned(), session_state, ttl).await;
            return Ok(fresh);
        }

        self.insert(session_key.as_ref().to_owned(), session_state, ttl).await;
        Ok(session_key)
    }

    async fn update_ttl(&self, session_key: &SessionKey, ttl: &Duration) -> Result<(), anyhow::Error> {
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get_mut(session_key.as_ref()) {
            entry.expires_at = Utc::now() + chrono::Duration::seconds(ttl.whole_seconds());
        }
        Ok(())
    }

    async fn delete(&self, session_key: &SessionKey) -> Result<(), anyhow::Error> {
        self.sessions.write().await.remove(session_key.as_ref());
        Ok(())
    }
}

/// Session middleware with the `sid` cookie and the configured state TTL.
pub fn session_middleware<S: SessionStore + 'static>(store: S, key: Key, config: &AuthConfig) -> SessionMiddleware<S> {
    SessionMiddleware::builder(store, key)
        .cookie_name(SESSION_COOKIE.to_string())
        .cookie_path("/".to_string())
        .cookie_http_only(true)
        .cookie_secure(config.cookie_secure)
        .session_lifecycle(BrowserSession::default().state_ttl(Duration::minutes(config.session_ttl_minutes)))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(user: &str) -> SessionState {
        HashMap::from([("user".to_string(), format!("{{\"username\":\"{user}\"}}"))])
    }

    #[tokio::test]
    async fn test_save_issues_fresh_keys() {
        let store = MemorySessionStore::new();
        let first = store.save(state("alice"), &Duration::hours(1)).await.unwrap();
        let second = store.save(state("bob"), &Duration::hours(1)).await.unwrap();

        assert_ne!(first.as_ref(), second.as_ref());
        assert_eq!(store.load(&first).await.unwrap(), Some(state("alice")));
        assert_eq!(store.keys().await.len(), 2);
    }

    #[tokio::test]
    async fn test_update_of_unknown_key_issues_new_key() {
        let store = MemorySessionStore::new();
        let planted = SessionKey::try_from("attacker-chosen-session-key".to_string()).unwrap();

        let issued = store.update(planted, state("alice"), &Duration::hours(1)).await.unwrap();

        assert_ne!(issued.as_ref(), "attacker-chosen-session-key");
        assert!(store.get("attacker-chosen-session-key").await.is_none());
        assert_eq!(store.get(issued.as_ref()).await, Some(state("alice")));
    }

    #[tokio::test]
    async fn test_update_of_known_key_keeps_key() {
        let store = MemorySessionStore::new();
        let key = store.save(state("alice"), &Duration::hours(1)).await.unwrap();
        let raw = key.as_ref().to_string();

        let updated = store.update(key, state("alice2"), &Duration::hours(1)).await.unwrap();
        assert_eq!(updated.as_ref(), raw);
        assert_eq!(store.get(&raw).await, Some(state("alice2")));
    }

    #[tokio::test]
    async fn test_expired_session_reads_as_absent() {
        let store = MemorySessionStore::new();
        let key = store.save(state("alice"), &Duration::ZERO).await.unwrap();

        assert!(store.load(&key).await.unwrap().is_none());
        assert!(store.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_evict_expired() {
        let store = MemorySessionStore::new();
        store.save(state("bob"), &Duration::hours(1)).await.unwrap();
        store.save(state("alice"), &Duration::ZERO).await.unwrap();

        assert_eq!(store.evict_expired().await, 1);
        assert_eq!(store.keys().await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemorySessionStore::new();
        let key = store.save(state("alice"), &Duration::hours(1)).await.unwrap();
        store.delete(&key).await.unwrap();
        assert!(store.load(&key).await.unwrap().is_none());
    }
}
