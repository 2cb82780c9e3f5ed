//! SessionRunner – convenience wrapper that restores a persisted session,
//! applies exactly **one** navigation step, and persists the updated snapshot
//! back to storage.
//!
//! Embedders that keep a live `QuestionnaireSession` (one logical session per
//! orchestrator instance) don't need this; it exists for stateless hosts that
//! rebuild the session per interaction from `StateStorage` plus the query
//! mirror, where forgetting the save step is the easy bug.

use std::sync::Arc;

use crate::error::{FlowError, Result};
use crate::model::QuestionnaireData;
use crate::navigator::FilteringNavigator;
use crate::query::QueryState;
use crate::session::QuestionnaireSession;
use crate::storage::{PersistedSession, StateStorage};

#[derive(Clone)]
pub struct SessionRunner {
    data: Arc<QuestionnaireData>,
    navigator: Arc<FilteringNavigator>,
    storage: Arc<dyn StateStorage>,
}

impl SessionRunner {
    pub fn new(
        data: Arc<QuestionnaireData>,
        navigator: Arc<FilteringNavigator>,
        storage: Arc<dyn StateStorage>,
    ) -> Self {
        Self { data, navigator, storage }
    }

    /// Answer the current question for `key` and return the query state the
    /// host should mirror. A missing snapshot means a fresh session: the
    /// first answer starts the flow.
    pub async fn answer(
        &self,
        key: &str,
        query: &QueryState,
        selected: &[String],
    ) -> Result<QueryState> {
        let mut session = self.rebuild(key, query).await?;
        session.answer_question(selected)?;
        self.save(key, &session).await?;
        Ok(session.query_state())
    }

    /// Step the session for `key` back one question. Unlike `answer`, a
    /// session that was never saved cannot go back.
    pub async fn back(&self, key: &str, query: &QueryState) -> Result<QueryState> {
        if self.storage.get(key).await?.is_none() {
            return Err(FlowError::SessionNotFound(key.to_string()));
        }
        let mut session = self.rebuild(key, query).await?;
        session.go_back()?;
        self.save(key, &session).await?;
        Ok(session.query_state())
    }

    /// Reset the session for `key` to the start question.
    pub async fn reset(&self, key: &str) -> Result<QueryState> {
        let mut session = self.rebuild(key, &QueryState::Empty).await?;
        session.reset_questionnaire();
        self.save(key, &session).await?;
        Ok(session.query_state())
    }

    async fn rebuild(&self, key: &str, query: &QueryState) -> Result<QuestionnaireSession> {
        let mut session =
            QuestionnaireSession::with_data(self.navigator.clone(), self.data.clone());
        if let Some(persisted) = self.storage.get(key).await? {
            session.restore(persisted.snapshot);
        }
        session.apply_query(query);
        Ok(session)
    }

    async fn save(&self, key: &str, session: &QuestionnaireSession) -> Result<()> {
        self.storage
            .save(PersistedSession::with_key(key.to_string(), session.snapshot()))
            .await
    }
}
