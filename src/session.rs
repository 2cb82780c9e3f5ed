use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::answers::{AnswerLog, AnswerRecord};
use crate::error::{FlowError, Result};
use crate::model::{QuestionConfig, QuestionnaireData, Treatment};
use crate::navigator::{FilteringNavigator, GeneratedQuestion};
use crate::query::QueryState;
use crate::resolver::{NextDestination, resolve_answer};
use crate::source::QuestionnaireSource;
use crate::storage::SessionSnapshot;

const FETCH_ERROR_FALLBACK: &str = "Failed to load questionnaire";

/// Logical position of a session. `NotStarted` doubles as the "no current
/// question" state after a dead-end answer; with data loaded it resolves to
/// the configured start question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    NotStarted,
    Question(String),
    Results,
}

/// The session state machine's externally visible states. Whether a
/// `Question` position is a filter question is decided by the sub-flow flag
/// together with the filter catalog, never by the id alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    OnQuestion(String),
    OnFilterQuestion(String),
    OnResults,
}

/// The question to render right now: a static-graph node, or a filter
/// question resolved against the current candidate set.
#[derive(Debug, Clone, PartialEq)]
pub enum CurrentQuestion<'a> {
    Static(&'a QuestionConfig),
    Filter(GeneratedQuestion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub percentage: u32,
}

/// Stateful controller for one questionnaire run.
///
/// Owns all mutable session state exclusively; every navigation operation is
/// a synchronous in-memory transition. The filtered candidate set is always
/// recomputed from the result-page union and the recorded filter answers,
/// never patched in place, so editing an earlier answer and replaying gives
/// the same result as a fresh run.
pub struct QuestionnaireSession {
    navigator: Arc<FilteringNavigator>,
    data: Option<Arc<QuestionnaireData>>,
    loading: bool,
    error: Option<String>,
    position: Position,
    in_filtering: bool,
    answers: AnswerLog,
    history: Vec<String>,
    result_page_ids: Vec<String>,
    filtered: Vec<Treatment>,
}

impl QuestionnaireSession {
    pub fn new(navigator: Arc<FilteringNavigator>) -> Self {
        Self {
            navigator,
            data: None,
            loading: false,
            error: None,
            position: Position::NotStarted,
            in_filtering: false,
            answers: AnswerLog::new(),
            history: Vec::new(),
            result_page_ids: Vec::new(),
            filtered: Vec::new(),
        }
    }

    pub fn with_data(navigator: Arc<FilteringNavigator>, data: Arc<QuestionnaireData>) -> Self {
        let mut session = Self::new(navigator);
        session.data = Some(data);
        session
    }

    /// Fetch the questionnaire document through the external source.
    ///
    /// On failure the error message is stored verbatim (with a generic
    /// fallback for empty messages) and any previously loaded data stays
    /// untouched. Never returns an error to the caller.
    pub async fn load_questionnaire(&mut self, source: &dyn QuestionnaireSource) {
        self.loading = true;
        self.error = None;
        match source.fetch().await {
            Ok(data) => {
                debug!(questions = data.questions.len(), treatments = data.treatments.len(), "questionnaire loaded");
                self.data = Some(Arc::new(data));
            }
            Err(err) => {
                let mut message = err.to_string();
                if message.is_empty() {
                    message = FETCH_ERROR_FALLBACK.to_string();
                }
                warn!(error = %message, "failed to load questionnaire");
                self.error = Some(message);
            }
        }
        self.loading = false;
    }

    pub fn data(&self) -> Option<&QuestionnaireData> {
        self.data.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn is_in_filtering_flow(&self) -> bool {
        self.in_filtering
    }

    pub fn answers(&self) -> &AnswerLog {
        &self.answers
    }

    pub fn navigation_history(&self) -> &[String] {
        &self.history
    }

    pub fn result_page_ids(&self) -> &[String] {
        &self.result_page_ids
    }

    pub fn filtered_treatments(&self) -> &[Treatment] {
        &self.filtered
    }

    pub fn state(&self) -> SessionState {
        match &self.position {
            Position::NotStarted => SessionState::NotStarted,
            Position::Results => SessionState::OnResults,
            Position::Question(id) if self.is_filter_position(id) => {
                SessionState::OnFilterQuestion(id.clone())
            }
            Position::Question(id) => SessionState::OnQuestion(id.clone()),
        }
    }

    /// The id the session is logically on: the explicit position when set,
    /// otherwise the configured start question once data is loaded.
    pub fn current_question_id(&self) -> Option<String> {
        match &self.position {
            Position::Question(id) => Some(id.clone()),
            Position::Results => None,
            Position::NotStarted => self
                .data
                .as_ref()
                .map(|data| data.meta.start_question.clone()),
        }
    }

    /// Resolve the current question object. A lookup miss (unknown id, or a
    /// filter question whose generation is suppressed) yields `None`; the UI
    /// layer treats that as nothing to show.
    pub fn current_question(&self) -> Option<CurrentQuestion<'_>> {
        let id = match &self.position {
            Position::Results => return None,
            Position::Question(id) => id.clone(),
            Position::NotStarted => self.data.as_ref()?.meta.start_question.clone(),
        };
        if self.is_filter_position(&id) {
            return self
                .navigator
                .generate_question(&id, &self.filtered)
                .map(CurrentQuestion::Filter);
        }
        self.data.as_ref()?.questions.get(&id).map(CurrentQuestion::Static)
    }

    fn is_filter_position(&self, id: &str) -> bool {
        self.in_filtering && self.navigator.contains(id)
    }

    /// Record an answer for the current question and advance.
    ///
    /// Fails without mutating anything when the selection is empty or there
    /// is no current question.
    pub fn answer_question(&mut self, selected: &[String]) -> Result<()> {
        if selected.is_empty() {
            return Err(FlowError::EmptySelection);
        }
        if self.current_question().is_none() {
            return Err(FlowError::NoCurrentQuestion);
        }

        let current_id = self
            .current_question_id()
            .ok_or(FlowError::NoCurrentQuestion)?;
        if self.is_filter_position(&current_id) {
            self.answer_filter_question(current_id, selected)
        } else {
            self.answer_regular_question(current_id, selected)
        }
    }

    fn answer_filter_question(&mut self, current_id: String, selected: &[String]) -> Result<()> {
        self.answers
            .insert(current_id.clone(), AnswerRecord::filtering(selected.to_vec()));
        let next_id = self
            .navigator
            .next_question_id(&current_id)
            .map(str::to_string);
        self.recompute_filtered();

        match next_id {
            Some(next_id) => {
                debug!(from = %current_id, to = %next_id, "advancing filter sub-flow");
                self.history.push(current_id);
                self.position = Position::Question(next_id);
            }
            None => {
                debug!(from = %current_id, "filter sub-flow complete, showing results");
                self.in_filtering = false;
                self.position = Position::Results;
            }
        }
        Ok(())
    }

    fn answer_regular_question(&mut self, current_id: String, selected: &[String]) -> Result<()> {
        let data = self.data.clone().ok_or(FlowError::NoCurrentQuestion)?;
        let question = data
            .questions
            .get(&current_id)
            .ok_or(FlowError::NoCurrentQuestion)?;

        self.history.push(current_id.clone());
        let resolution = resolve_answer(selected, &question.options, &data);
        self.answers.insert(
            current_id.clone(),
            AnswerRecord::regular(selected.to_vec(), resolution.display_texts),
        );

        match resolution.next {
            NextDestination::Filtering => {
                debug!(from = %current_id, result_pages = ?resolution.result_page_ids, "entering filter sub-flow");
                self.in_filtering = true;
                self.result_page_ids = resolution.result_page_ids;
                match self.navigator.first_question_id() {
                    Some(first_id) => self.position = Position::Question(first_id.to_string()),
                    None => {
                        // Empty filter catalog: nothing to narrow by.
                        self.in_filtering = false;
                        self.position = Position::Results;
                    }
                }
                self.recompute_filtered();
            }
            NextDestination::Question(next_id) => {
                debug!(from = %current_id, to = %next_id, "advancing static graph");
                self.position = Position::Question(next_id);
            }
            NextDestination::DeadEnd => {
                debug!(from = %current_id, "answer resolved to no destination");
                self.position = Position::NotStarted;
            }
        }
        Ok(())
    }

    /// Step back to the previously visited question, removing its answer.
    pub fn go_back(&mut self) -> Result<()> {
        if self.history.is_empty() {
            warn!("no navigation history, cannot go back");
            return Err(FlowError::NoHistory);
        }

        if self.position == Position::Results {
            // The last filter question was never pushed, so the top of the
            // history is the question to land on. It stays in the history.
            if let Some(last_id) = self.history.last().cloned() {
                self.answers.remove(&last_id);
                self.result_page_ids.clear();
                self.in_filtering = self.navigator.contains(&last_id);
                self.position = Position::Question(last_id);
            }
            return Ok(());
        }

        if self.in_filtering {
            self.recompute_filtered();
        }

        let prev_id = self.history.pop().ok_or(FlowError::NoHistory)?;
        self.answers.remove(&prev_id);
        self.in_filtering = self.navigator.contains(&prev_id);
        self.position = Position::Question(prev_id);
        Ok(())
    }

    /// Clear every recorded answer and return to the start question.
    pub fn reset_questionnaire(&mut self) {
        self.answers.clear();
        self.result_page_ids.clear();
        self.history.clear();
        self.error = None;
        self.filtered.clear();
        self.in_filtering = false;
        self.position = match &self.data {
            Some(data) => Position::Question(data.meta.start_question.clone()),
            None => Position::NotStarted,
        };
    }

    pub fn has_progress(&self) -> bool {
        self.position == Position::Results || !self.history.is_empty()
    }

    /// Step counter for the UI. Filter questions count toward the numerator
    /// through their answers but not toward the denominator.
    pub fn progress(&self) -> Progress {
        let total = self
            .data
            .as_ref()
            .map(|data| data.questions.len())
            .unwrap_or(0);
        let current = self.answers.len() + 1;
        let percentage = if total > 0 {
            ((current as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };
        Progress { current, total, percentage }
    }

    /// Rebuild the filtered candidate set: union the treatments of the
    /// accumulated result pages (first-seen order, deduplicated), then replay
    /// every recorded filter answer in catalog order.
    fn recompute_filtered(&mut self) {
        let Some(data) = &self.data else {
            self.filtered.clear();
            return;
        };
        if self.result_page_ids.is_empty() {
            self.filtered.clear();
            return;
        }

        let mut seen = HashSet::new();
        let mut treatments = Vec::new();
        for page_id in &self.result_page_ids {
            let Some(page) = data.results.get(page_id) else {
                continue;
            };
            for treatment_id in &page.treatments {
                if seen.insert(treatment_id.as_str()) {
                    if let Some(treatment) = data.treatments.get(treatment_id) {
                        treatments.push(treatment.clone());
                    }
                }
            }
        }

        self.filtered = self.navigator.apply_all(treatments, &self.answers);
    }

    /// The query-store shape for the current logical position.
    pub fn query_state(&self) -> QueryState {
        match &self.position {
            Position::NotStarted => QueryState::Empty,
            Position::Question(id) => QueryState::Question(id.clone()),
            Position::Results => QueryState::Results { result_ids: self.result_page_ids.clone() },
        }
    }

    /// Adopt a position requested through the query store. Unknown question
    /// ids are ignored; the current position stands.
    pub fn apply_query(&mut self, query: &QueryState) {
        match query {
            QueryState::Question(id)
                if self.navigator.contains(id)
                    || self
                        .data
                        .as_ref()
                        .is_some_and(|data| data.questions.contains_key(id)) =>
            {
                self.position = Position::Question(id.clone());
            }
            QueryState::Question(id) => {
                warn!(question_id = %id, "ignoring query for unknown question");
            }
            QueryState::Results { .. } => {
                self.position = Position::Results;
            }
            QueryState::Empty => {
                self.position = Position::NotStarted;
            }
        }
    }

    /// The persistable subset of this session's state. The position itself is
    /// owned by the query mirror.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            answers: self.answers.clone(),
            navigation_history: self.history.clone(),
            result_page_ids: self.result_page_ids.clone(),
            in_filtering: self.in_filtering,
            filtered: self.filtered.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: SessionSnapshot) {
        self.answers = snapshot.answers;
        self.history = snapshot.navigation_history;
        self.result_page_ids = snapshot.result_page_ids;
        self.in_filtering = snapshot.in_filtering;
        self.filtered = snapshot.filtered;
    }
}

impl Default for QuestionnaireSession {
    fn default() -> Self {
        Self::new(Arc::new(FilteringNavigator::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AppConfig, MetaConfig, OptionConfig, QuestionType, ResultPage};
    use std::collections::HashMap;

    fn treatment(id: &str, price: &str, downtime: &str, count: &str) -> Treatment {
        Treatment {
            id: id.to_string(),
            name: id.to_string(),
            price_from: price.to_string(),
            downtime: downtime.to_string(),
            number_of_treatments: count.to_string(),
            ..Treatment::default()
        }
    }

    fn sample_data() -> QuestionnaireData {
        QuestionnaireData {
            meta: MetaConfig {
                version: "1".to_string(),
                start_question: "skin_concern".to_string(),
                title: "Treatment finder".to_string(),
                description: String::new(),
            },
            questions: HashMap::from([
                (
                    "skin_concern".to_string(),
                    QuestionConfig {
                        id: "skin_concern".to_string(),
                        text: "What is your main concern?".to_string(),
                        question_type: QuestionType::SingleChoice,
                        options: vec![
                            OptionConfig {
                                value: "wrinkles".to_string(),
                                text: "Fine lines and wrinkles".to_string(),
                                next: Some("age_group".to_string()),
                            },
                            OptionConfig {
                                value: "texture".to_string(),
                                text: "Skin texture".to_string(),
                                next: Some("texture_results".to_string()),
                            },
                        ],
                        category: None,
                    },
                ),
                (
                    "age_group".to_string(),
                    QuestionConfig {
                        id: "age_group".to_string(),
                        text: "How old are you?".to_string(),
                        question_type: QuestionType::SingleChoice,
                        options: vec![OptionConfig {
                            value: "under_35".to_string(),
                            text: "Under 35".to_string(),
                            next: Some("wrinkle_results".to_string()),
                        }],
                        category: None,
                    },
                ),
            ]),
            results: HashMap::from([
                (
                    "texture_results".to_string(),
                    ResultPage {
                        id: "texture_results".to_string(),
                        title: "Texture".to_string(),
                        treatments: vec![
                            "botox".to_string(),
                            "laser".to_string(),
                            "facelift".to_string(),
                        ],
                        description: String::new(),
                    },
                ),
                (
                    "wrinkle_results".to_string(),
                    ResultPage {
                        id: "wrinkle_results".to_string(),
                        title: "Wrinkles".to_string(),
                        treatments: vec!["botox".to_string()],
                        description: String::new(),
                    },
                ),
            ]),
            treatments: HashMap::from([
                ("botox".to_string(), treatment("botox", "£250", "1-2 days", "1")),
                ("laser".to_string(), treatment("laser", "£800", "7-10 days", "3-4")),
                ("facelift".to_string(), treatment("facelift", "£5,000", "14-21 days", "1")),
            ]),
            config: AppConfig::default(),
        }
    }

    fn session() -> QuestionnaireSession {
        QuestionnaireSession::with_data(
            Arc::new(FilteringNavigator::default()),
            Arc::new(sample_data()),
        )
    }

    #[test]
    fn fresh_session_falls_back_to_start_question() {
        let session = session();
        assert_eq!(session.state(), SessionState::NotStarted);
        assert_eq!(session.current_question_id().as_deref(), Some("skin_concern"));
        assert!(matches!(
            session.current_question(),
            Some(CurrentQuestion::Static(q)) if q.id == "skin_concern"
        ));
    }

    #[test]
    fn empty_selection_is_rejected_without_mutation() {
        let mut session = session();
        let err = session.answer_question(&[]).unwrap_err();
        assert!(matches!(err, FlowError::EmptySelection));
        assert!(session.answers().is_empty());
        assert!(session.navigation_history().is_empty());
    }

    #[test]
    fn answer_without_current_question_is_rejected() {
        let mut session = QuestionnaireSession::default();
        let err = session.answer_question(&["a".to_string()]).unwrap_err();
        assert!(matches!(err, FlowError::NoCurrentQuestion));
    }

    #[test]
    fn question_pointer_advances_the_static_graph() {
        let mut session = session();
        session.answer_question(&["wrinkles".to_string()]).unwrap();

        assert_eq!(session.state(), SessionState::OnQuestion("age_group".to_string()));
        assert_eq!(session.navigation_history(), ["skin_concern".to_string()]);
        let record = session.answers().get("skin_concern").unwrap();
        assert_eq!(record.display_text, vec!["Fine lines and wrinkles".to_string()]);
        assert!(!record.is_filtering);
    }

    #[test]
    fn result_pointer_enters_filter_flow_at_first_catalog_question() {
        let mut session = session();
        session.answer_question(&["texture".to_string()]).unwrap();

        assert!(session.is_in_filtering_flow());
        assert_eq!(
            session.state(),
            SessionState::OnFilterQuestion("downtime_preference".to_string())
        );
        assert_eq!(session.result_page_ids(), ["texture_results".to_string()]);
        assert_eq!(session.filtered_treatments().len(), 3);
        assert!(matches!(
            session.current_question(),
            Some(CurrentQuestion::Filter(q)) if q.id == "downtime_preference"
        ));
    }

    #[test]
    fn filter_answers_narrow_candidates_and_advance_in_order() {
        let mut session = session();
        session.answer_question(&["texture".to_string()]).unwrap();

        session.answer_question(&["1-2_days".to_string()]).unwrap();
        assert_eq!(
            session.state(),
            SessionState::OnFilterQuestion("budget_preference".to_string())
        );
        let ids: Vec<&str> = session.filtered_treatments().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["botox"]);

        session.answer_question(&["no_preference".to_string()]).unwrap();
        session.answer_question(&["1".to_string()]).unwrap();

        assert_eq!(session.state(), SessionState::OnResults);
        assert!(!session.is_in_filtering_flow());
        assert_eq!(session.progress().current, 5);
    }

    #[test]
    fn editing_an_earlier_filter_answer_recomputes_from_scratch() {
        let mut session = session();
        session.answer_question(&["texture".to_string()]).unwrap();
        session.answer_question(&["14-21_days".to_string()]).unwrap();
        assert_eq!(session.filtered_treatments().len(), 3);

        // Walk back and tighten the downtime answer; the candidate set must
        // be identical to having answered that way from the start.
        session.go_back().unwrap();
        session.answer_question(&["1-2_days".to_string()]).unwrap();
        let ids: Vec<&str> = session.filtered_treatments().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["botox"]);
    }

    #[test]
    fn back_after_answer_restores_prior_state() {
        let mut session = session();
        session.answer_question(&["wrinkles".to_string()]).unwrap();
        session.go_back().unwrap();

        assert_eq!(session.state(), SessionState::OnQuestion("skin_concern".to_string()));
        assert!(session.answers().is_empty());
        assert!(session.navigation_history().is_empty());
    }

    #[test]
    fn back_with_no_history_is_refused() {
        let mut session = session();
        let err = session.go_back().unwrap_err();
        assert!(matches!(err, FlowError::NoHistory));
    }

    #[test]
    fn back_from_first_filter_question_leaves_the_sub_flow() {
        let mut session = session();
        session.answer_question(&["texture".to_string()]).unwrap();
        session.go_back().unwrap();

        assert!(!session.is_in_filtering_flow());
        assert_eq!(session.state(), SessionState::OnQuestion("skin_concern".to_string()));
        assert!(!session.answers().contains("skin_concern"));
    }

    #[test]
    fn back_from_results_returns_to_last_recorded_question() {
        let mut session = session();
        session.answer_question(&["texture".to_string()]).unwrap();
        session.answer_question(&["no_preference".to_string()]).unwrap();
        session.answer_question(&["no_preference".to_string()]).unwrap();
        session.answer_question(&["no_preference".to_string()]).unwrap();
        assert_eq!(session.state(), SessionState::OnResults);

        // The final filter question is never pushed, so the history top is
        // budget_preference. Its answer goes, the entry stays.
        let history_before = session.navigation_history().to_vec();
        session.go_back().unwrap();
        assert_eq!(
            session.state(),
            SessionState::OnFilterQuestion("budget_preference".to_string())
        );
        assert!(session.result_page_ids().is_empty());
        assert_eq!(session.navigation_history(), history_before);
        assert!(!session.answers().contains("budget_preference"));
    }

    #[test]
    fn dead_end_answer_clears_the_position() {
        let mut session = session();
        session.answer_question(&["unknown_choice".to_string()]).unwrap();
        // Falls back to the start question, mirroring a null current id.
        assert_eq!(session.state(), SessionState::NotStarted);
        assert_eq!(session.current_question_id().as_deref(), Some("skin_concern"));
    }

    #[test]
    fn reset_returns_to_start_and_clears_everything() {
        let mut session = session();
        session.answer_question(&["texture".to_string()]).unwrap();
        session.answer_question(&["1-2_days".to_string()]).unwrap();

        session.reset_questionnaire();
        assert_eq!(session.state(), SessionState::OnQuestion("skin_concern".to_string()));
        assert!(session.answers().is_empty());
        assert!(session.navigation_history().is_empty());
        assert!(session.result_page_ids().is_empty());
        assert!(session.filtered_treatments().is_empty());
        assert!(!session.is_in_filtering_flow());
        assert!(session.error().is_none());
    }

    #[test]
    fn progress_counts_static_questions_only_in_denominator() {
        let mut session = session();
        assert_eq!(session.progress(), Progress { current: 1, total: 2, percentage: 50 });

        session.answer_question(&["texture".to_string()]).unwrap();
        session.answer_question(&["no_preference".to_string()]).unwrap();
        let progress = session.progress();
        assert_eq!(progress.total, 2);
        assert_eq!(progress.current, 3);
        assert_eq!(progress.percentage, 150);
    }

    #[test]
    fn progress_is_zero_percent_without_data() {
        let session = QuestionnaireSession::default();
        assert_eq!(session.progress(), Progress { current: 1, total: 0, percentage: 0 });
    }

    #[test]
    fn query_state_mirrors_position() {
        let mut session = session();
        assert_eq!(session.query_state(), QueryState::Empty);

        session.answer_question(&["wrinkles".to_string()]).unwrap();
        assert_eq!(session.query_state(), QueryState::Question("age_group".to_string()));

        session.answer_question(&["under_35".to_string()]).unwrap();
        session.answer_question(&["no_preference".to_string()]).unwrap();
        session.answer_question(&["no_preference".to_string()]).unwrap();
        session.answer_question(&["no_preference".to_string()]).unwrap();
        assert_eq!(
            session.query_state(),
            QueryState::Results { result_ids: vec!["wrinkle_results".to_string()] }
        );
    }

    #[test]
    fn apply_query_adopts_known_positions_and_ignores_unknown() {
        let mut session = session();
        session.apply_query(&QueryState::Question("age_group".to_string()));
        assert_eq!(session.state(), SessionState::OnQuestion("age_group".to_string()));

        session.apply_query(&QueryState::Question("nonsense".to_string()));
        assert_eq!(session.state(), SessionState::OnQuestion("age_group".to_string()));

        session.apply_query(&QueryState::Results { result_ids: Vec::new() });
        assert_eq!(session.state(), SessionState::OnResults);

        session.apply_query(&QueryState::Empty);
        assert_eq!(session.state(), SessionState::NotStarted);
    }

    #[test]
    fn snapshot_restore_round_trips_session_state() {
        let mut session = session();
        session.answer_question(&["texture".to_string()]).unwrap();
        session.answer_question(&["1-2_days".to_string()]).unwrap();

        let snapshot = session.snapshot();
        let mut restored = QuestionnaireSession::with_data(
            Arc::new(FilteringNavigator::default()),
            Arc::new(sample_data()),
        );
        restored.restore(snapshot.clone());
        restored.apply_query(&session.query_state());

        assert_eq!(restored.state(), session.state());
        assert_eq!(restored.answers(), session.answers());
        assert_eq!(restored.navigation_history(), session.navigation_history());
        assert_eq!(restored.filtered_treatments(), session.filtered_treatments());
        assert_eq!(restored.snapshot(), snapshot);
    }

    #[tokio::test]
    async fn fetch_failure_stores_message_and_keeps_existing_data() {
        struct FailingSource;

        #[async_trait::async_trait]
        impl QuestionnaireSource for FailingSource {
            async fn fetch(&self) -> Result<QuestionnaireData> {
                Err(FlowError::FetchFailed("server unavailable".to_string()))
            }
        }

        let mut session = session();
        session.load_questionnaire(&FailingSource).await;

        assert_eq!(
            session.error(),
            Some("Questionnaire fetch failed: server unavailable")
        );
        assert!(session.data().is_some());
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn successful_load_populates_data_and_clears_error() {
        use crate::source::InMemoryQuestionnaireSource;

        let mut session = QuestionnaireSession::default();
        let source = InMemoryQuestionnaireSource::new(sample_data());
        session.load_questionnaire(&source).await;

        assert!(session.error().is_none());
        assert!(!session.is_loading());
        assert_eq!(session.current_question_id().as_deref(), Some("skin_concern"));
    }
}
