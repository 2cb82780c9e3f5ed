use tracing::warn;

use crate::answers::AnswerLog;
use crate::error::Result;
use crate::filters::{FilterKind, FilterOption, NO_PREFERENCE};
use crate::model::{QuestionType, Treatment};

pub const DEFAULT_SKIP_TEXT: &str = "No preference";

/// Static definition of one filter question. Configuration data, not mutated
/// at runtime; the extractor/applier pair is carried by `kind`.
#[derive(Debug, Clone)]
pub struct FilterQuestionDef {
    pub id: String,
    pub text: String,
    pub question_type: QuestionType,
    pub order: u32,
    pub allow_skip: bool,
    pub skip_text: Option<String>,
    pub kind: FilterKind,
}

/// A filter question resolved against a concrete candidate set, ready to
/// render. Carries its `kind` so the caller can apply the matching filter
/// once values are selected.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedQuestion {
    pub id: String,
    pub text: String,
    pub question_type: QuestionType,
    pub order: u32,
    pub options: Vec<FilterOption>,
    pub kind: FilterKind,
}

/// Wraps the ordered filter-question catalog and resolves question objects on
/// demand. Sorted ascending by `order` once at construction; order values are
/// expected unique.
pub struct FilteringNavigator {
    defs: Vec<FilterQuestionDef>,
}

impl FilteringNavigator {
    pub fn new(mut defs: Vec<FilterQuestionDef>) -> Self {
        defs.sort_by_key(|def| def.order);
        Self { defs }
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.defs.iter().any(|def| def.id == question_id)
    }

    pub fn definition(&self, question_id: &str) -> Option<&FilterQuestionDef> {
        self.defs.iter().find(|def| def.id == question_id)
    }

    /// Id of the minimum-order definition, or `None` for an empty catalog.
    pub fn first_question_id(&self) -> Option<&str> {
        self.defs.first().map(|def| def.id.as_str())
    }

    /// Id of the definition following `current_id` in sequence order;
    /// `None` when `current_id` is unknown or last.
    pub fn next_question_id(&self, current_id: &str) -> Option<&str> {
        let index = self.defs.iter().position(|def| def.id == current_id)?;
        self.defs.get(index + 1).map(|def| def.id.as_str())
    }

    /// Resolve a filter question against the current candidate set.
    ///
    /// Returns `None` for an unknown id, and also when the assembled option
    /// list ends up empty (no data-driven options and skip disallowed) —
    /// callers must treat that as "skip this question", not as an error.
    pub fn generate_question(
        &self,
        question_id: &str,
        treatments: &[Treatment],
    ) -> Option<GeneratedQuestion> {
        let def = self.definition(question_id)?;
        let extracted = if def.kind.has_options() {
            def.kind.extract_options(treatments)
        } else {
            Ok(Vec::new())
        };
        let options = assemble_options(def, extracted);
        if options.is_empty() {
            return None;
        }
        Some(GeneratedQuestion {
            id: def.id.clone(),
            text: def.text.clone(),
            question_type: def.question_type,
            order: def.order,
            options,
            kind: def.kind,
        })
    }

    /// Replay every recorded filter answer over `treatments`, in definition
    /// order. The filtered candidate set is always derived this way, never
    /// patched incrementally.
    pub fn apply_all(&self, treatments: Vec<Treatment>, answers: &AnswerLog) -> Vec<Treatment> {
        let mut current = treatments;
        for def in &self.defs {
            if let Some(record) = answers.get(&def.id) {
                if record.is_filtering {
                    current = def.kind.apply(&current, &record.values);
                }
            }
        }
        current
    }
}

/// Skip option first when allowed, then the extractor's options. A failed
/// extraction is logged and treated as if the extractor were absent.
fn assemble_options(
    def: &FilterQuestionDef,
    extracted: Result<Vec<FilterOption>>,
) -> Vec<FilterOption> {
    let mut options = Vec::new();
    if def.allow_skip {
        options.push(FilterOption {
            value: NO_PREFERENCE.to_string(),
            text: def
                .skip_text
                .clone()
                .unwrap_or_else(|| DEFAULT_SKIP_TEXT.to_string()),
        });
    }
    match extracted {
        Ok(data_options) => options.extend(data_options),
        Err(err) => {
            warn!(question_id = %def.id, error = %err, "option extraction failed; question degrades to skip-only");
        }
    }
    options
}

/// The production catalog: downtime, then budget, then treatment count, all
/// skippable.
impl Default for FilteringNavigator {
    fn default() -> Self {
        Self::new(vec![
            FilterQuestionDef {
                id: "downtime_preference".to_string(),
                text: "How much downtime can you accommodate?".to_string(),
                question_type: QuestionType::SingleChoice,
                order: 1,
                allow_skip: true,
                skip_text: Some("No preference".to_string()),
                kind: FilterKind::Downtime,
            },
            FilterQuestionDef {
                id: "budget_preference".to_string(),
                text: "What budget range are you most comfortable with?".to_string(),
                question_type: QuestionType::SingleChoice,
                order: 2,
                allow_skip: true,
                skip_text: Some("No preference".to_string()),
                kind: FilterKind::Budget,
            },
            FilterQuestionDef {
                id: "treatment_count_preference".to_string(),
                text: "How many treatment sessions do you prefer?".to_string(),
                question_type: QuestionType::SingleChoice,
                order: 3,
                allow_skip: true,
                skip_text: Some("No preference".to_string()),
                kind: FilterKind::TreatmentCount,
            },
        ])
    }
}
