use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::aggregate::RiskScores;
use crate::scoring::Disease;

use super::error::AssessmentError;
use super::state::{check_score, AssessmentState};

pub type SessionId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEntry {
    pub state: AssessmentState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionEntry {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            state: AssessmentState::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => now - self.updated_at > ttl,
            Err(_) => false,
        }
    }
}

/// Concurrent in-memory assessment sessions keyed by an opaque id.
///
/// With a TTL, sessions idle longer than it are dropped on the next
/// `create` or `record`. Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<DashMap<SessionId, SessionEntry>>,
    ttl: Option<Duration>,
}

impl SessionStore {
    /// Store whose sessions never expire.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::default(),
            ttl: Some(ttl),
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Start an empty session and return its id.
    pub fn create(&self) -> SessionId {
        self.expire_idle();
        let id = uuid::Uuid::new_v4().to_string();
        self.inner.insert(id.clone(), SessionEntry::new());
        tracing::debug!(session = %id, "session created");
        id
    }

    pub fn get(&self, id: &str) -> Option<AssessmentState> {
        self.inner.get(id).map(|entry| entry.state)
    }

    /// Store a disease score in a session. Returns the updated state.
    ///
    /// Scores must be finite and within [0, 1]; an expired session is unknown.
    pub fn record(
        &self,
        id: &str,
        disease: Disease,
        score: f64,
    ) -> Result<AssessmentState, AssessmentError> {
        let score = check_score(disease, score)?;
        self.expire_idle();
        let mut entry = self
            .inner
            .get_mut(id)
            .ok_or_else(|| AssessmentError::UnknownSession(id.to_string()))?;
        entry.state = entry.state.with_score(disease, score);
        entry.updated_at = Utc::now();
        Ok(entry.state)
    }

    /// All three scores of a session, if it is complete.
    pub fn ready_scores(&self, id: &str) -> Result<RiskScores, AssessmentError> {
        let state = self
            .get(id)
            .ok_or_else(|| AssessmentError::UnknownSession(id.to_string()))?;
        state.scores()
    }

    /// Discard a session, returning its final state.
    pub fn end(&self, id: &str) -> Option<AssessmentState> {
        self.inner.remove(id).map(|(_, entry)| entry.state)
    }

    /// Drop sessions idle for longer than `ttl`. Returns how many were removed.
    pub fn purge_expired(&self, ttl: Duration) -> usize {
        let now = Utc::now();
        let before = self.inner.len();
        self.inner.retain(|_, entry| !entry.is_expired(ttl, now));
        let removed = before.saturating_sub(self.inner.len());
        if removed > 0 {
            tracing::debug!(removed, "expired sessions purged");
        }
        removed
    }

    fn expire_idle(&self) {
        if let Some(ttl) = self.ttl {
            self.purge_expired(ttl);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
