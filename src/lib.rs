//! Branching-questionnaire engine: a static question graph resolves answers
//! to further questions or result pages, result pages open a data-driven
//! filter sub-flow that narrows the candidate treatment set, and the session
//! state machine keeps the whole thing consistent across back-navigation,
//! reset, query mirroring and persistence.

pub mod answers;
pub mod error;
pub mod filters;
pub mod model;
pub mod navigator;
pub mod query;
pub mod resolver;
pub mod runner;
pub mod session;
pub mod source;
pub mod storage;

// Re-export commonly used types
pub use answers::{AnswerLog, AnswerRecord};
pub use error::{FlowError, Result};
pub use filters::{
    BUDGET_BANDS, BudgetBand, DOWNTIME_BANDS, DowntimeBand, FilterKind, FilterOption,
    NO_PREFERENCE,
};
pub use model::{
    AppConfig, MetaConfig, OptionConfig, QuestionConfig, QuestionType, QuestionnaireData,
    ResultPage, Treatment,
};
pub use navigator::{DEFAULT_SKIP_TEXT, FilterQuestionDef, FilteringNavigator, GeneratedQuestion};
pub use query::{InMemoryQueryStore, QueryMirror, QueryState, QueryStore};
pub use resolver::{AnswerResolution, NextDestination, resolve_answer};
pub use runner::SessionRunner;
pub use session::{CurrentQuestion, Position, Progress, QuestionnaireSession, SessionState};
pub use source::{InMemoryQuestionnaireSource, QuestionnaireSource};
pub use storage::{InMemoryStateStorage, PersistedSession, SessionSnapshot, StateStorage};
