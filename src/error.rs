use thiserror::Error;

/// Errors surfaced by the flow engine.
///
/// Lookup misses (unknown question ids, unknown filter ids) are deliberately
/// `None` results rather than errors; the variants here cover caller misuse
/// and the async seams (fetch, storage).
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("No current question to answer")]
    NoCurrentQuestion,

    #[error("Selection is empty")]
    EmptySelection,

    #[error("No navigation history to go back to")]
    NoHistory,

    #[error("Option extraction failed: {0}")]
    OptionExtraction(String),

    #[error("Questionnaire fetch failed: {0}")]
    FetchFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlowError>;
