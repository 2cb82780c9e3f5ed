use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::Result;
use crate::model::Treatment;

/// Reserved selection value meaning "apply no filter; pass all items through".
///
/// Shared between option generation and filter application; the two must
/// agree on the literal or a skip selection silently falls through to
/// band-based filtering.
pub const NO_PREFERENCE: &str = "no_preference";

/// A presentable filter choice derived from the candidate set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    pub text: String,
}

/// Fixed downtime bands used to label raw downtime strings.
/// `max_days: None` is the unbounded band.
pub struct DowntimeBand {
    pub label: &'static str,
    pub max_days: Option<u32>,
}

pub const DOWNTIME_BANDS: [DowntimeBand; 4] = [
    DowntimeBand { label: "No downtime", max_days: Some(0) },
    DowntimeBand { label: "Minimal downtime", max_days: Some(3) },
    DowntimeBand { label: "Moderate downtime", max_days: Some(6) },
    DowntimeBand { label: "Significant downtime", max_days: None },
];

/// Fixed budget bands with `[min, max)` membership; `max: None` is unbounded.
pub struct BudgetBand {
    pub value: &'static str,
    pub text: &'static str,
    pub min: u32,
    pub max: Option<u32>,
}

pub const BUDGET_BANDS: [BudgetBand; 4] = [
    BudgetBand { value: "0-50", text: "£0 - £150", min: 0, max: Some(150) },
    BudgetBand { value: "150-300", text: "£150 - £300", min: 150, max: Some(300) },
    BudgetBand { value: "300-500", text: "£300 - £500", min: 300, max: Some(500) },
    BudgetBand { value: "500", text: "£500+", min: 500, max: None },
];

/// Closed set of filter strategies. Each variant pairs an option extractor
/// with a filter applier over the candidate treatment set.
///
/// `Passthrough` contributes no data-driven options and applies the identity
/// filter; a question carrying it is only presentable when skipping is
/// allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Downtime,
    Budget,
    TreatmentCount,
    Passthrough,
}

impl FilterKind {
    /// Whether this kind derives options from the candidate set at all.
    pub fn has_options(&self) -> bool {
        !matches!(self, FilterKind::Passthrough)
    }

    /// Derive the presentable choices from the current candidate set.
    ///
    /// Deterministic for a given input slice, including option order, so
    /// repeated navigation to the same question renders identically.
    pub fn extract_options(&self, treatments: &[Treatment]) -> Result<Vec<FilterOption>> {
        Ok(match self {
            FilterKind::Downtime => extract_downtime_options(treatments),
            FilterKind::Budget => extract_budget_options(treatments),
            FilterKind::TreatmentCount => extract_treatment_count_options(treatments),
            FilterKind::Passthrough => Vec::new(),
        })
    }

    /// Reduce the candidate set by the selected values.
    ///
    /// The `no_preference` sentinel is the identity regardless of any other
    /// selected value; otherwise the predicate derives from the first
    /// selection. Malformed item fields never cause an error here, they
    /// degrade to the documented fallbacks.
    pub fn apply(&self, treatments: &[Treatment], selected: &[String]) -> Vec<Treatment> {
        if selected.iter().any(|v| v == NO_PREFERENCE) {
            return treatments.to_vec();
        }
        match self {
            FilterKind::Downtime => filter_by_downtime(treatments, selected),
            FilterKind::Budget => filter_by_budget(treatments, selected),
            FilterKind::TreatmentCount => filter_by_treatment_count(treatments, selected),
            FilterKind::Passthrough => treatments.to_vec(),
        }
    }
}

/// All non-negative integers embedded in a free-text field, in order.
fn embedded_integers(text: &str) -> Vec<u32> {
    let mut numbers = Vec::new();
    let mut digits = String::new();
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
        } else if !digits.is_empty() {
            if let Ok(n) = digits.parse() {
                numbers.push(n);
            }
            digits.clear();
        }
    }
    if !digits.is_empty() {
        if let Ok(n) = digits.parse() {
            numbers.push(n);
        }
    }
    numbers
}

/// Maximum downtime in days for a raw downtime string; 0 when nothing parses.
pub(crate) fn max_days_from_downtime(downtime: &str) -> u32 {
    embedded_integers(downtime).into_iter().max().unwrap_or(0)
}

/// The band a downtime of `max_days` falls into.
fn downtime_band(max_days: u32) -> &'static DowntimeBand {
    DOWNTIME_BANDS
        .iter()
        .find(|band| band.max_days.is_none_or(|limit| max_days <= limit))
        .unwrap_or(&DOWNTIME_BANDS[DOWNTIME_BANDS.len() - 1])
}

/// Leading integer of a price string after stripping currency symbols and
/// commas. Missing or non-numeric prices parse as 0.
pub(crate) fn parse_price(price: &str) -> u32 {
    let cleaned: String = price.chars().filter(|c| *c != '£' && *c != ',').collect();
    let digits: String = cleaned
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Lower-cased, whitespace-to-underscore form used as a selectable value.
fn normalize_value(raw: &str) -> String {
    raw.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

/// Each distinct raw downtime string becomes a candidate option labeled with
/// its band name. Options are de-duplicated by band label, first seen wins:
/// two raw strings in the same band collapse to one option carrying the
/// first-seen raw value.
fn extract_downtime_options(treatments: &[Treatment]) -> Vec<FilterOption> {
    let mut seen_raw = HashSet::new();
    let mut seen_bands = HashSet::new();
    let mut options = Vec::new();

    for treatment in treatments {
        let downtime = treatment.downtime.trim();
        if downtime.is_empty() || !seen_raw.insert(downtime.to_string()) {
            continue;
        }
        let band = downtime_band(max_days_from_downtime(downtime));
        if seen_bands.insert(band.label) {
            options.push(FilterOption {
                value: normalize_value(downtime),
                text: band.label.to_string(),
            });
        }
    }
    options
}

/// Keep treatments whose own maximum downtime fits under the selected one.
/// Treatments with no downtime information are excluded, not treated as zero.
fn filter_by_downtime(treatments: &[Treatment], selected: &[String]) -> Vec<Treatment> {
    let selected_downtime = selected
        .first()
        .map(|v| v.replace('_', " "))
        .unwrap_or_default();
    let selected_max = max_days_from_downtime(&selected_downtime);

    treatments
        .iter()
        .filter(|t| {
            !t.downtime.trim().is_empty() && max_days_from_downtime(&t.downtime) <= selected_max
        })
        .cloned()
        .collect()
}

/// Offer only the predefined bands that contain at least one observed price.
/// Zero or unparseable prices are excluded from the range computation.
fn extract_budget_options(treatments: &[Treatment]) -> Vec<FilterOption> {
    let prices: Vec<u32> = treatments
        .iter()
        .map(|t| parse_price(&t.price_from))
        .filter(|price| *price > 0)
        .collect();

    if prices.is_empty() {
        return Vec::new();
    }

    BUDGET_BANDS
        .iter()
        .filter(|band| {
            prices
                .iter()
                .any(|price| *price >= band.min && band.max.is_none_or(|max| *price < max))
        })
        .map(|band| FilterOption {
            value: band.value.to_string(),
            text: band.text.to_string(),
        })
        .collect()
}

/// Keep treatments priced at or under the selected band's upper bound: the
/// portion after the separator when present, otherwise the value itself.
/// A price that fails to parse counts as 0 and always passes.
fn filter_by_budget(treatments: &[Treatment], selected: &[String]) -> Vec<Treatment> {
    let Some(selected_budget) = selected.first() else {
        return treatments.to_vec();
    };
    let bound_text = selected_budget
        .rsplit('-')
        .next()
        .unwrap_or(selected_budget);
    let bound = parse_price(bound_text);

    treatments
        .iter()
        .filter(|t| parse_price(&t.price_from) <= bound)
        .cloned()
        .collect()
}

/// Offer "single" when any observed count string contains a `1`, and
/// "multiple" when any observed value is a range or a single integer above 1.
fn extract_treatment_count_options(treatments: &[Treatment]) -> Vec<FilterOption> {
    let mut seen = HashSet::new();
    let mut counts = Vec::new();
    for treatment in treatments {
        let count = treatment.number_of_treatments.trim();
        if !count.is_empty() && seen.insert(count) {
            counts.push(count);
        }
    }

    let has_single = counts.iter().any(|count| count.contains('1'));
    let has_multiple = counts.iter().any(|count| {
        let numbers = embedded_integers(count);
        match numbers.first() {
            None => false,
            Some(first) => count.contains('-') || *first > 1,
        }
    });

    let mut options = Vec::new();
    if has_single {
        options.push(FilterOption {
            value: "1".to_string(),
            text: "Single treatment".to_string(),
        });
    }
    if has_multiple {
        options.push(FilterOption {
            value: "2".to_string(),
            text: "More than one treatment".to_string(),
        });
    }
    options
}

/// "1" keeps treatments whose count field is exactly "1" or empty. "2" keeps
/// everything: any treatment's sessions could in principle be repeated.
fn filter_by_treatment_count(treatments: &[Treatment], selected: &[String]) -> Vec<Treatment> {
    match selected.first().map(String::as_str) {
        Some("1") => treatments
            .iter()
            .filter(|t| {
                let count = t.number_of_treatments.as_str();
                count == "1" || count.is_empty()
            })
            .cloned()
            .collect(),
        _ => treatments.to_vec(),
    }
}
