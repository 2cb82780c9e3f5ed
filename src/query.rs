use std::sync::Mutex;

/// The three mutually exclusive URL shapes the session mirrors to the query
/// store: a question in progress, the results page, or nothing (initial or
/// reset state).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    Empty,
    Question(String),
    Results { result_ids: Vec<String> },
}

impl QueryState {
    /// Normalized key/value pairs for this state. Result ids are
    /// comma-joined so the results link stays shareable.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        match self {
            QueryState::Empty => Vec::new(),
            QueryState::Question(id) => vec![("question".to_string(), id.clone())],
            QueryState::Results { result_ids } => {
                let mut pairs = vec![("results".to_string(), "true".to_string())];
                if !result_ids.is_empty() {
                    pairs.push(("resultIds".to_string(), result_ids.join(",")));
                }
                pairs
            }
        }
    }

    /// Parse a raw pair set back into a state. A `question` key wins over the
    /// results flag; anything else is the empty state.
    pub fn from_pairs(pairs: &[(String, String)]) -> QueryState {
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        if let Some(id) = get("question") {
            return QueryState::Question(id.to_string());
        }
        if get("results") == Some("true") {
            let result_ids = get("resultIds")
                .map(|joined| {
                    joined
                        .split(',')
                        .filter(|part| !part.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            return QueryState::Results { result_ids };
        }
        QueryState::Empty
    }
}

/// External query-parameter store (in the reference deployment, the URL).
pub trait QueryStore: Send + Sync {
    fn read(&self) -> Vec<(String, String)>;
    fn write(&self, pairs: Vec<(String, String)>);
}

/// Mirrors the session's logical position into a `QueryStore`, suppressing
/// writes when the serialized query would be unchanged.
pub struct QueryMirror<S: QueryStore> {
    store: S,
}

impl<S: QueryStore> QueryMirror<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn read_state(&self) -> QueryState {
        QueryState::from_pairs(&self.store.read())
    }

    pub fn write_state(&self, state: &QueryState) {
        let pairs = state.to_pairs();
        if pairs != self.store.read() {
            self.store.write(pairs);
        }
    }
}

/// Query store held in memory, for tests and headless embedding.
#[derive(Default)]
pub struct InMemoryQueryStore {
    pairs: Mutex<Vec<(String, String)>>,
    writes: Mutex<usize>,
}

impl InMemoryQueryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `write` was invoked; lets tests assert no-op diffing.
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl QueryStore for InMemoryQueryStore {
    fn read(&self) -> Vec<(String, String)> {
        self.pairs.lock().unwrap().clone()
    }

    fn write(&self, pairs: Vec<(String, String)>) {
        *self.pairs.lock().unwrap() = pairs;
        *self.writes.lock().unwrap() += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_shape_round_trips() {
        let state = QueryState::Question("skin_concern".to_string());
        let pairs = state.to_pairs();
        assert_eq!(pairs, vec![("question".to_string(), "skin_concern".to_string())]);
        assert_eq!(QueryState::from_pairs(&pairs), state);
    }

    #[test]
    fn results_shape_joins_ids_with_commas() {
        let state = QueryState::Results {
            result_ids: vec!["r1".to_string(), "r2".to_string()],
        };
        let pairs = state.to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("results".to_string(), "true".to_string()),
                ("resultIds".to_string(), "r1,r2".to_string()),
            ]
        );
        assert_eq!(QueryState::from_pairs(&pairs), state);
    }

    #[test]
    fn results_shape_without_ids_omits_the_key() {
        let state = QueryState::Results { result_ids: Vec::new() };
        let pairs = state.to_pairs();
        assert_eq!(pairs.len(), 1);
        assert_eq!(QueryState::from_pairs(&pairs), state);
    }

    #[test]
    fn empty_shape_is_no_pairs() {
        assert!(QueryState::Empty.to_pairs().is_empty());
        assert_eq!(QueryState::from_pairs(&[]), QueryState::Empty);
    }

    #[test]
    fn question_key_wins_over_results_flag() {
        let pairs = vec![
            ("results".to_string(), "true".to_string()),
            ("question".to_string(), "q1".to_string()),
        ];
        assert_eq!(
            QueryState::from_pairs(&pairs),
            QueryState::Question("q1".to_string())
        );
    }

    #[test]
    fn mirror_suppresses_unchanged_writes() {
        let mirror = QueryMirror::new(InMemoryQueryStore::new());
        let state = QueryState::Question("q1".to_string());

        mirror.write_state(&state);
        mirror.write_state(&state);
        assert_eq!(mirror.store().write_count(), 1);

        mirror.write_state(&QueryState::Results { result_ids: vec!["r1".to_string()] });
        assert_eq!(mirror.store().write_count(), 2);
        assert_eq!(
            mirror.read_state(),
            QueryState::Results { result_ids: vec!["r1".to_string()] }
        );
    }
}
