use crate::model::{OptionConfig, QuestionnaireData};

/// Where an answered static-graph question leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextDestination {
    /// One or more selected options pointed at result pages; the session
    /// should enter the filter sub-flow.
    Filtering,
    /// Move to another static-graph question.
    Question(String),
    /// No selected option carried a usable pointer.
    DeadEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResolution {
    pub display_texts: Vec<String>,
    /// Deduplicated result page ids, in selection order. Empty unless
    /// `next` is `Filtering`.
    pub result_page_ids: Vec<String>,
    pub next: NextDestination,
}

/// Map a regular question's selected values onto the next destination.
///
/// Display text falls back to the raw value for stale or unknown selections;
/// `next` pointers that match neither graph are dropped. Result-page pointers
/// take priority over question pointers when both are present, and the first
/// question pointer wins ties in selection order.
pub fn resolve_answer(
    selected: &[String],
    options: &[OptionConfig],
    data: &QuestionnaireData,
) -> AnswerResolution {
    let find_option = |value: &str| options.iter().find(|opt| opt.value == value);

    let display_texts = selected
        .iter()
        .map(|value| {
            find_option(value)
                .map(|opt| opt.text.clone())
                .unwrap_or_else(|| value.clone())
        })
        .collect();

    let pointers = selected
        .iter()
        .filter_map(|value| find_option(value).and_then(|opt| opt.next.as_deref()));

    let mut result_page_ids: Vec<String> = Vec::new();
    let mut question_ids: Vec<&str> = Vec::new();
    for pointer in pointers {
        if data.results.contains_key(pointer) {
            if !result_page_ids.iter().any(|id| id == pointer) {
                result_page_ids.push(pointer.to_string());
            }
        } else if data.questions.contains_key(pointer) {
            question_ids.push(pointer);
        }
    }

    let next = if !result_page_ids.is_empty() {
        NextDestination::Filtering
    } else if let Some(first) = question_ids.first() {
        NextDestination::Question((*first).to_string())
    } else {
        NextDestination::DeadEnd
    };

    AnswerResolution { display_texts, result_page_ids, next }
}
