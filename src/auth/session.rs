//! # Session Store
//!
//! In-process map from opaque admin session tokens to the login that
//! obtained them.
//!
//! ## Invariants
//! - A token is either present (valid) or absent; lookups never check time.
//! - Expiry is enforced by a deferred eviction task scheduled at issue time
//!   on the tokio runtime. There is no sliding renewal.
//! - `issue` and `evict` take the write lock; `validate` and `identity` take
//!   the read lock, so validations never block each other.
//! - Eviction tasks hold a weak reference to the store and only remove the
//!   entry generation they were scheduled for.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::crypto::{generate_session_token, token_fingerprint};
use super::errors::{AuthError, AuthResult};
use crate::observability::{log_event_with_fields, Event};

/// Default session lifetime: 24 hours
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Session store configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Time from issuance to unconditional eviction
    pub ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_SESSION_TTL,
        }
    }
}

/// Token handed to a client on successful login
#[derive(Debug, Clone, Serialize)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

struct SessionEntry {
    identity: String,
    generation: u64,
    eviction: Option<JoinHandle<()>>,
}

struct SessionInner {
    tokens: RwLock<HashMap<String, SessionEntry>>,
    next_generation: AtomicU64,
}

impl SessionInner {
    /// Remove `token` if it still holds `generation`; called by the timer
    fn expire(&self, token: &str, generation: u64) {
        let Ok(mut tokens) = self.tokens.write() else {
            return;
        };
        if tokens.get(token).map(|e| e.generation) != Some(generation) {
            return;
        }
        tokens.remove(token);
        drop(tokens);

        log_event_with_fields(
            Event::SessionEvicted,
            &[("reason", "expired"), ("token", &token_fingerprint(token))],
        );
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        let tokens = match self.tokens.get_mut() {
            Ok(tokens) => tokens,
            Err(poisoned) => poisoned.into_inner(),
        };
        for (_, entry) in tokens.drain() {
            if let Some(handle) = entry.eviction {
                handle.abort();
            }
        }
    }
}

/// Concurrent admin session store
///
/// Constructed once per process and shared by reference. Dropping the last
/// reference (or calling [`SessionStore::shutdown`]) cancels every pending
/// eviction.
pub struct SessionStore {
    inner: Arc<SessionInner>,
    config: SessionConfig,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                tokens: RwLock::new(HashMap::new()),
                next_generation: AtomicU64::new(1),
            }),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Issue a fresh token for `identity` and schedule its eviction
    ///
    /// Must be called from within a tokio runtime. The returned token was
    /// not present in the store at the moment it was inserted.
    pub fn issue(&self, identity: &str) -> AuthResult<IssuedSession> {
        let runtime = Handle::try_current().map_err(|_| AuthError::SchedulerUnavailable)?;
        let lifetime = chrono::Duration::from_std(self.config.ttl)
            .map_err(|_| AuthError::StorageError("session ttl out of range".to_string()))?;
        let deadline = tokio::time::Instant::now()
            .checked_add(self.config.ttl)
            .ok_or_else(|| AuthError::StorageError("session ttl out of range".to_string()))?;

        let mut tokens = self
            .inner
            .tokens
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;

        let mut token = generate_session_token();
        while tokens.contains_key(&token) {
            token = generate_session_token();
        }

        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let weak: Weak<SessionInner> = Arc::downgrade(&self.inner);
        let key = token.clone();

        // Spawned under the write lock: the timer cannot observe the map
        // before this entry is in it.
        let eviction = runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(inner) = weak.upgrade() {
                inner.expire(&key, generation);
            }
        });

        tokens.insert(
            token.clone(),
            SessionEntry {
                identity: identity.to_string(),
                generation,
                eviction: Some(eviction),
            },
        );
        drop(tokens);

        log_event_with_fields(
            Event::SessionIssued,
            &[("identity", identity), ("token", &token_fingerprint(&token))],
        );

        Ok(IssuedSession {
            token,
            expires_at: Utc::now() + lifetime,
        })
    }

    /// True iff `token` is currently present
    pub fn validate(&self, token: &str) -> bool {
        match self.inner.tokens.read() {
            Ok(tokens) => tokens.contains_key(token),
            Err(_) => false,
        }
    }

    /// Login that obtained `token`, if it is still valid
    pub fn identity(&self, token: &str) -> Option<String> {
        let tokens = self.inner.tokens.read().ok()?;
        tokens.get(token).map(|e| e.identity.clone())
    }

    /// Remove a token and cancel its pending eviction; absent tokens are a no-op
    pub fn evict(&self, token: &str) {
        let removed = match self.inner.tokens.write() {
            Ok(mut tokens) => tokens.remove(token),
            Err(_) => None,
        };
        if let Some(entry) = removed {
            if let Some(handle) = entry.eviction {
                handle.abort();
            }
            log_event_with_fields(
                Event::SessionEvicted,
                &[("reason", "evicted"), ("token", &token_fingerprint(token))],
            );
        }
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.inner.tokens.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every session and cancel all pending evictions
    ///
    /// Returns the number of sessions dropped.
    pub fn shutdown(&self) -> usize {
        let drained: Vec<SessionEntry> = match self.inner.tokens.write() {
            Ok(mut tokens) => tokens.drain().map(|(_, entry)| entry).collect(),
            Err(_) => Vec::new(),
        };
        for entry in &drained {
            if let Some(handle) = &entry.eviction {
                handle.abort();
            }
        }
        drained.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.len())
            .field("ttl", &self.config.ttl)
            .finish()
    }
}
