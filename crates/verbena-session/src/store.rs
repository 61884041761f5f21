//! The concurrent session store.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use lru::LruCache;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::idle::IdleTracker;

/// A handle to one session's value.
///
/// Holding the mutex serializes turns against the same session while leaving
/// the store's map available to other sessions.
pub type SessionHandle<V> = Arc<Mutex<V>>;

/// Inner state protected by the store lock.
struct StoreInner<V> {
    /// Live sessions, least-recently-used first out when over capacity.
    sessions: LruCache<String, SessionHandle<V>>,

    /// Idle tracking for time-based eviction.
    idle: IdleTracker,
}

/// Concurrent map of session id to session value.
///
/// - `get_or_create_with` is the only implicit-creation path.
/// - Values are handed out as [`SessionHandle`]s: a turn locks its session
///   for exclusive access while other sessions proceed concurrently.
/// - The map itself is guarded by an `RwLock`, so concurrent creation of
///   distinct session ids is safe.
/// - Capacity is bounded with LRU eviction; idle sessions can additionally
///   be swept with [`SessionStore::evict_idle`].
///
/// Process-wide state starts empty and nothing survives a restart.
pub struct SessionStore<V> {
    inner: Arc<RwLock<StoreInner<V>>>,
    config: StoreConfig,
}

impl<V> Clone for SessionStore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            config: self.config.clone(),
        }
    }
}

impl<V: Send + 'static> SessionStore<V> {
    /// Create a new, empty session store.
    pub fn new(config: StoreConfig) -> Self {
        let cap =
            NonZeroUsize::new(config.max_sessions).unwrap_or_else(|| NonZeroUsize::new(1).unwrap());

        let inner = StoreInner {
            sessions: LruCache::new(cap),
            idle: IdleTracker::new(),
        };

        Self {
            inner: Arc::new(RwLock::new(inner)),
            config,
        }
    }

    /// Get the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Get the current number of live sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.sessions.is_empty()
    }

    /// Check whether a session id is live without touching its idle clock.
    pub async fn contains(&self, session_id: &str) -> bool {
        self.inner.read().await.sessions.peek(session_id).is_some()
    }

    /// Fetch an existing session, or create one with `init`.
    ///
    /// This is the single implicit-creation path: every other accessor either
    /// fails or is a no-op for unknown ids. Marks the session as recently
    /// active either way.
    pub async fn get_or_create_with<F>(&self, session_id: &str, init: F) -> SessionHandle<V>
    where
        F: FnOnce() -> V,
    {
        let mut inner = self.inner.write().await;

        if let Some(handle) = inner.sessions.get(session_id) {
            trace!(session_id = %session_id, "Session found in store");
            let handle = Arc::clone(handle);
            inner.idle.touch(session_id);
            return handle;
        }

        let handle: SessionHandle<V> = Arc::new(Mutex::new(init()));

        // Pushing at capacity drops the least recently used session.
        if let Some((evicted_id, _)) = inner
            .sessions
            .push(session_id.to_string(), Arc::clone(&handle))
        {
            if evicted_id != session_id {
                debug!(session_id = %evicted_id, "Evicted LRU session to make room");
                inner.idle.remove(&evicted_id);
            }
        }
        inner.idle.touch(session_id);

        debug!(
            session_id = %session_id,
            live_sessions = inner.sessions.len(),
            "Created session"
        );

        handle
    }

    /// Fetch an existing session, failing if the id was never created.
    pub async fn get(&self, session_id: &str) -> Result<SessionHandle<V>> {
        let mut inner = self.inner.write().await;
        match inner.sessions.get(session_id) {
            Some(handle) => {
                let handle = Arc::clone(handle);
                inner.idle.touch(session_id);
                Ok(handle)
            }
            None => Err(Error::UnknownSession(session_id.to_string())),
        }
    }

    /// Remove a session entirely.
    ///
    /// Idempotent: removing an unknown id succeeds and creates nothing.
    /// Returns whether an entry existed. A turn already holding the session
    /// handle finishes on the detached value.
    pub async fn remove(&self, session_id: &str) -> bool {
        let mut inner = self.inner.write().await;
        inner.idle.remove(session_id);
        let existed = inner.sessions.pop(session_id).is_some();
        if existed {
            debug!(session_id = %session_id, "Session removed");
        }
        existed
    }

    /// Evict all sessions idle longer than `max_age`, returning their ids.
    pub async fn evict_idle(&self, max_age: Duration) -> Vec<String> {
        let mut inner = self.inner.write().await;
        let expired = inner.idle.drain_idle(max_age);
        for id in &expired {
            inner.sessions.pop(id);
        }
        if !expired.is_empty() {
            debug!(evicted = expired.len(), "Evicted idle sessions");
        }
        expired
    }

    /// Spawn a background task sweeping idle sessions on the configured
    /// interval. Returns `None` when no idle timeout is configured.
    pub fn spawn_cleanup_task(&self) -> Option<tokio::task::JoinHandle<()>> {
        let max_age = self.config.idle_timeout?;
        let interval = self.config.cleanup_interval;
        let store = self.clone();

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                store.evict_idle(max_age).await;
            }
        }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn store(config: StoreConfig) -> SessionStore<Vec<String>> {
        SessionStore::new(config)
    }

    #[tokio::test]
    async fn test_get_or_create_then_reuse() {
        let store = store(StoreConfig::default());

        let handle = store.get_or_create_with("ws-1", Vec::new).await;
        handle.lock().await.push("hello".to_string());

        let again = store.get_or_create_with("ws-1", Vec::new).await;
        assert_eq!(again.lock().await.len(), 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_session_fails() {
        let store = store(StoreConfig::default());
        let err = store.get("nope").await.unwrap_err();
        assert!(matches!(err, Error::UnknownSession(_)));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent_and_creates_nothing() {
        let store = store(StoreConfig::default());

        assert!(!store.remove("never-created").await);
        assert!(store.is_empty().await);

        store.get_or_create_with("ws-1", Vec::new).await;
        assert!(store.remove("ws-1").await);
        assert!(!store.remove("ws-1").await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_used() {
        let store = store(StoreConfig::default().with_max_sessions(2));

        store.get_or_create_with("a", Vec::new).await;
        store.get_or_create_with("b", Vec::new).await;
        // Touch "a" so "b" is the LRU entry.
        store.get("a").await.unwrap();
        store.get_or_create_with("c", Vec::new).await;

        assert_eq!(store.len().await, 2);
        assert!(store.contains("a").await);
        assert!(!store.contains("b").await);
        assert!(store.contains("c").await);
    }

    #[tokio::test]
    async fn test_evict_idle() {
        let store = store(StoreConfig::default());

        store.get_or_create_with("stale", Vec::new).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        store.get_or_create_with("fresh", Vec::new).await;

        let evicted = store.evict_idle(Duration::from_millis(10)).await;
        assert_eq!(evicted, vec!["stale".to_string()]);
        assert!(!store.contains("stale").await);
        assert!(store.contains("fresh").await);
    }

    #[tokio::test]
    async fn test_concurrent_creation_of_distinct_ids() {
        let store = store(StoreConfig::default());

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .get_or_create_with(&format!("ws-{i}"), Vec::new)
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len().await, 16);
    }

    #[tokio::test]
    async fn test_detached_session_after_remove() {
        let store = store(StoreConfig::default());

        let handle = store.get_or_create_with("ws-1", Vec::new).await;
        let mut guard = handle.lock().await;
        store.remove("ws-1").await;

        // The held handle still works on the detached value.
        guard.push("still here".to_string());
        assert_eq!(guard.len(), 1);
    }
}
