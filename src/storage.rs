use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::answers::AnswerLog;
use crate::error::Result;
use crate::model::Treatment;

/// The serializable subset of session state. Together with the query mirror
/// (which owns the current position) this reconstructs a session exactly:
/// answers keep their insertion order through the answer log's
/// array-of-pairs encoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub answers: AnswerLog,
    pub navigation_history: Vec<String>,
    pub result_page_ids: Vec<String>,
    pub in_filtering: bool,
    pub filtered: Vec<Treatment>,
}

/// Storage envelope for one session snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
    pub key: String,
    pub saved_at: DateTime<Utc>,
    pub snapshot: SessionSnapshot,
}

impl PersistedSession {
    pub fn new(snapshot: SessionSnapshot) -> Self {
        Self::with_key(Uuid::new_v4().to_string(), snapshot)
    }

    pub fn with_key(key: String, snapshot: SessionSnapshot) -> Self {
        Self { key, saved_at: Utc::now(), snapshot }
    }
}

/// Durable key-value store for session snapshots. Last writer wins when
/// multiple writers share a key.
#[async_trait]
pub trait StateStorage: Send + Sync {
    async fn save(&self, session: PersistedSession) -> Result<()>;
    async fn get(&self, key: &str) -> Result<Option<PersistedSession>>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// In-memory implementation of `StateStorage`.
pub struct InMemoryStateStorage {
    sessions: Arc<DashMap<String, PersistedSession>>,
}

impl InMemoryStateStorage {
    pub fn new() -> Self {
        Self { sessions: Arc::new(DashMap::new()) }
    }
}

impl Default for InMemoryStateStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStorage for InMemoryStateStorage {
    async fn save(&self, session: PersistedSession) -> Result<()> {
        self.sessions.insert(session.key.clone(), session);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<PersistedSession>> {
        Ok(self.sessions.get(key).map(|entry| entry.clone()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.sessions.remove(key);
        Ok(())
    }
}
