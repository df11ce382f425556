//! Server-side wizard sessions keyed by an opaque cookie.
//!
//! Records carry a revision so a save computed from a stale read (two tabs racing on the same
//! session) is rejected instead of silently overwriting newer state.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use super::domain::ApplicationDraft;
use crate::workflows::hiring::identity::PendingAuthorization;

pub const SESSION_COOKIE: &str = "corecrew_sid";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Accept only ids this service could have minted.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::try_parse(raw)
            .ok()
            .map(|id| Self(id.simple().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the wizard keeps between requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub draft: Option<ApplicationDraft>,
    pub authorization: Option<PendingAuthorization>,
}

impl SessionData {
    pub fn is_empty(&self) -> bool {
        self.draft.is_none() && self.authorization.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub data: SessionData,
    pub revision: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session was changed by another request")]
    Conflict,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionError>;

    /// Persist `data` if the stored revision still equals `expected_revision` (0 for a session
    /// that does not exist yet) and return the new revision.
    async fn save(
        &self,
        id: &SessionId,
        data: SessionData,
        expected_revision: u64,
    ) -> Result<u64, SessionError>;

    async fn remove(&self, id: &SessionId) -> Result<(), SessionError>;

    /// Drop sessions idle for longer than the TTL, returning how many were removed.
    async fn purge_expired(&self) -> Result<usize, SessionError>;
}

struct Entry {
    record: SessionRecord,
    touched: Instant,
}

/// Process-local store with idle expiry.
pub struct MemorySessionStore {
    ttl: Duration,
    entries: Mutex<HashMap<SessionId, Entry>>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    fn expired(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.touched) > self.ttl
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        if entries.get(id).is_some_and(|entry| self.expired(entry, now)) {
            entries.remove(id);
            return Ok(None);
        }
        Ok(entries.get_mut(id).map(|entry| {
            entry.touched = now;
            entry.record.clone()
        }))
    }

    async fn save(
        &self,
        id: &SessionId,
        data: SessionData,
        expected_revision: u64,
    ) -> Result<u64, SessionError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let current = entries
            .get(id)
            .filter(|entry| !self.expired(entry, now))
            .map(|entry| entry.record.revision)
            .unwrap_or(0);

        if current != expected_revision {
            return Err(SessionError::Conflict);
        }

        let revision = current + 1;
        entries.insert(
            id.clone(),
            Entry {
                record: SessionRecord { data, revision },
                touched: now,
            },
        );
        Ok(revision)
    }

    async fn remove(&self, id: &SessionId) -> Result<(), SessionError> {
        self.entries.lock().await.remove(id);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, SessionError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| !self.expired(entry, now));
        Ok(before - entries.len())
    }
}

/// Attributes of the session cookie.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    pub secure: bool,
    pub max_age: Duration,
}

impl CookiePolicy {
    fn set(&self, id: &SessionId) -> Option<HeaderValue> {
        let mut cookie = format!(
            "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.max_age.as_secs()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).ok()
    }

    fn clear(&self) -> Option<HeaderValue> {
        let mut cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).ok()
    }
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
}

/// A session read at the start of a request and written back at the end.
#[derive(Debug)]
pub struct LoadedSession {
    id: Option<SessionId>,
    revision: u64,
    pub data: SessionData,
}

impl LoadedSession {
    /// Unknown, malformed or expired cookies yield an empty session.
    pub async fn load(
        store: &dyn SessionStore,
        headers: &HeaderMap,
    ) -> Result<Self, SessionError> {
        let Some(id) = cookie_value(headers, SESSION_COOKIE).and_then(SessionId::parse) else {
            return Ok(Self::fresh());
        };

        Ok(match store.load(&id).await? {
            Some(record) => Self {
                id: Some(id),
                revision: record.revision,
                data: record.data,
            },
            None => Self::fresh(),
        })
    }

    fn fresh() -> Self {
        Self {
            id: None,
            revision: 0,
            data: SessionData::default(),
        }
    }

    /// Write the session back and return the `Set-Cookie` header to attach, if any.
    ///
    /// An emptied session is removed from the store and its cookie cleared.
    pub async fn commit(
        self,
        store: &dyn SessionStore,
        cookies: CookiePolicy,
    ) -> Result<Option<HeaderValue>, SessionError> {
        if self.data.is_empty() {
            return match self.id {
                Some(id) => {
                    store.remove(&id).await?;
                    Ok(cookies.clear())
                }
                None => Ok(None),
            };
        }

        let id = self.id.unwrap_or_else(SessionId::generate);
        store.save(&id, self.data, self.revision).await?;
        Ok(cookies.set(&id))
    }
}
