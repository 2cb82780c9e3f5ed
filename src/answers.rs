use serde::{Deserialize, Serialize};

/// One recorded answer: the selected values, their display texts, and whether
/// it was given inside the filter sub-flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub values: Vec<String>,
    pub display_text: Vec<String>,
    #[serde(default)]
    pub is_filtering: bool,
}

impl AnswerRecord {
    pub fn regular(values: Vec<String>, display_text: Vec<String>) -> Self {
        Self { values, display_text, is_filtering: false }
    }

    pub fn filtering(values: Vec<String>) -> Self {
        let display_text = values.clone();
        Self { values, display_text, is_filtering: true }
    }
}

/// Insertion-ordered mapping from question id to its answer.
///
/// Backed by a vector of pairs, which is also its wire format: serializing
/// yields an array of `[id, record]` pairs and deserializing reconstructs the
/// log exactly, insertion order included. Re-answering a question updates the
/// record in place without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerLog(Vec<(String, AnswerRecord)>);

impl AnswerLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question_id: impl Into<String>, record: AnswerRecord) {
        let question_id = question_id.into();
        match self.0.iter_mut().find(|(id, _)| *id == question_id) {
            Some(entry) => entry.1 = record,
            None => self.0.push((question_id, record)),
        }
    }

    pub fn get(&self, question_id: &str) -> Option<&AnswerRecord> {
        self.0
            .iter()
            .find(|(id, _)| id == question_id)
            .map(|(_, record)| record)
    }

    pub fn remove(&mut self, question_id: &str) -> Option<AnswerRecord> {
        let index = self.0.iter().position(|(id, _)| id == question_id)?;
        Some(self.0.remove(index).1)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.get(question_id).is_some()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerRecord)> {
        self.0.iter().map(|(id, record)| (id.as_str(), record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_preserves_insertion_order() {
        let mut log = AnswerLog::new();
        log.insert("q1", AnswerRecord::regular(vec!["a".into()], vec!["A".into()]));
        log.insert("q2", AnswerRecord::filtering(vec!["b".into()]));
        log.insert("q3", AnswerRecord::regular(vec!["c".into()], vec!["C".into()]));

        let ids: Vec<&str> = log.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["q1", "q2", "q3"]);
    }

    #[test]
    fn reanswering_keeps_entry_position() {
        let mut log = AnswerLog::new();
        log.insert("q1", AnswerRecord::regular(vec!["a".into()], vec!["A".into()]));
        log.insert("q2", AnswerRecord::regular(vec!["b".into()], vec!["B".into()]));
        log.insert("q1", AnswerRecord::regular(vec!["z".into()], vec!["Z".into()]));

        let ids: Vec<&str> = log.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["q1", "q2"]);
        assert_eq!(log.get("q1").unwrap().values, vec!["z".to_string()]);
    }

    #[test]
    fn remove_deletes_only_the_named_entry() {
        let mut log = AnswerLog::new();
        log.insert("q1", AnswerRecord::regular(vec!["a".into()], vec!["A".into()]));
        log.insert("q2", AnswerRecord::filtering(vec!["b".into()]));

        assert!(log.remove("q1").is_some());
        assert!(log.remove("q1").is_none());
        assert_eq!(log.len(), 1);
        assert!(log.contains("q2"));
    }

    #[test]
    fn serializes_as_array_of_pairs_and_round_trips() {
        let mut log = AnswerLog::new();
        log.insert("skin_concern", AnswerRecord::regular(vec!["acne".into()], vec!["Acne".into()]));
        log.insert("downtime_preference", AnswerRecord::filtering(vec!["0_days".into()]));
        log.insert("budget_preference", AnswerRecord::filtering(vec!["150-300".into()]));

        let json = serde_json::to_string(&log).unwrap();
        assert!(json.starts_with('['));

        let restored: AnswerLog = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, log);
        let ids: Vec<&str> = restored.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["skin_concern", "downtime_preference", "budget_preference"]);
    }

    #[test]
    fn filtering_flag_defaults_to_false_on_decode() {
        let json = r#"[["q1", {"values": ["a"], "display_text": ["A"]}]]"#;
        let log: AnswerLog = serde_json::from_str(json).unwrap();
        assert!(!log.get("q1").unwrap().is_filtering);
    }
}
