use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a question is presented and how many values it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    FaceMap,
}

/// A selectable option on a question.
///
/// `next` points either at another question id or at a result page id; the
/// resolver decides which graph it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionConfig {
    pub value: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// A node in the static question graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionConfig {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Vec<OptionConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// A candidate treatment record. Immutable reference data loaded once.
///
/// `price_from`, `downtime` and `number_of_treatments` are free-text fields
/// straight from the data source; the filter module owns all parsing and
/// degrades malformed values to defined fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub areas: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub price_from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_last: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_visible: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub downtime: String,
    #[serde(default)]
    pub number_of_treatments: String,
}

/// A named bucket of treatments reachable from the static question graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    pub id: String,
    pub title: String,
    pub treatments: Vec<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaConfig {
    pub version: String,
    pub start_question: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub max_steps: u32,
    #[serde(default)]
    pub show_progress: bool,
    #[serde(default)]
    pub progress_tracking: bool,
    #[serde(default)]
    pub analytics_tracking: bool,
    #[serde(default)]
    pub animation_duration: u32,
    #[serde(default)]
    pub allow_back_navigation: bool,
}

/// The questionnaire definition document returned by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireData {
    pub meta: MetaConfig,
    pub questions: HashMap<String, QuestionConfig>,
    pub results: HashMap<String, ResultPage>,
    pub treatments: HashMap<String, Treatment>,
    #[serde(default)]
    pub config: AppConfig,
}
