use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::answers::AnswerValue;

/// Publication state of a question set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSetStatus {
    Draft,
    Published,
}

/// Question set as returned by the list endpoint (no questions embedded)
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct QuestionSetSummary {
    pub id: i64,
    pub service_id: i64,
    #[serde(default)]
    pub name: String,
    pub status: QuestionSetStatus,
    /// Missing means active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub is_active: Option<bool>,
    pub version: i32,
}

impl QuestionSetSummary {
    /// Whether this set may be offered to customers
    pub fn is_eligible(&self) -> bool {
        self.status == QuestionSetStatus::Published && self.is_active != Some(false)
    }
}

/// Full question set with its ordered questions
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct QuestionSet {
    pub id: i64,
    pub service_id: i64,
    #[serde(default)]
    pub name: String,
    pub status: QuestionSetStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub is_active: Option<bool>,
    pub version: i32,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Type tag of a question, decides the legal shape of its answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Text,
    Number,
    Boolean,
    Select,
    MultiSelect,
    Date,
    File,
}

impl QuestionType {
    /// Whether `value` counts as a non-empty answer for this question type.
    ///
    /// Shapes that do not belong to the type are treated as unanswered.
    pub fn is_answered(&self, value: Option<&AnswerValue>) -> bool {
        let Some(value) = value else {
            return false;
        };

        match (self, value) {
            (QuestionType::Text | QuestionType::Date | QuestionType::Select, AnswerValue::Text(s)) => {
                !s.trim().is_empty()
            }
            (QuestionType::Number, AnswerValue::Text(s)) => !s.trim().is_empty(),
            (QuestionType::Number, AnswerValue::Number(n)) => n.is_finite(),
            (QuestionType::Boolean, AnswerValue::Flag(_)) => true,
            (QuestionType::MultiSelect, AnswerValue::Choices(choices)) => !choices.is_empty(),
            (QuestionType::File, AnswerValue::File(_)) => true,
            _ => false,
        }
    }
}

/// A single question definition inside a question set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct Question {
    pub id: i64,
    /// Stable key used in the answers map, unique within the set
    pub key: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub description: Option<String>,
    pub question_type: QuestionType,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub sort_order: i32,
    /// Allowed choices for select and multi_select questions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub max_value: Option<f64>,
    /// Accepted file extensions or MIME types, e.g. `["jpg", "image/png"]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub allowed_file_types: Option<Vec<String>>,
    /// Maximum upload size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub max_file_size: Option<u64>,
}

impl Question {
    pub fn new(id: i64, key: impl Into<String>, label: impl Into<String>, question_type: QuestionType) -> Self {
        Self {
            id,
            key: key.into(),
            label: label.into(),
            description: None,
            question_type,
            is_required: false,
            sort_order: 0,
            options: None,
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
            allowed_file_types: None,
            max_file_size: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Client-injected questions carry negative ids and never exist server-side
    pub fn is_synthetic(&self) -> bool {
        self.id < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::FileHandle;

    #[test]
    fn test_question_type_wire_names() {
        let json = serde_json::to_string(&QuestionType::MultiSelect).unwrap();
        assert_eq!(json, "\"multi_select\"");

        let parsed: QuestionType = serde_json::from_str("\"date\"").unwrap();
        assert_eq!(parsed, QuestionType::Date);
    }

    #[test]
    fn test_summary_eligibility() {
        let mut summary = QuestionSetSummary {
            id: 1,
            service_id: 7,
            name: "Plumbing".to_string(),
            status: QuestionSetStatus::Published,
            is_active: None,
            version: 2,
        };
        assert!(summary.is_eligible());

        summary.is_active = Some(false);
        assert!(!summary.is_eligible());

        summary.is_active = Some(true);
        summary.status = QuestionSetStatus::Draft;
        assert!(!summary.is_eligible());
    }

    #[test]
    fn test_is_answered_per_type() {
        let text = AnswerValue::Text("  ".to_string());
        assert!(!QuestionType::Text.is_answered(Some(&text)));
        assert!(!QuestionType::Text.is_answered(None));
        assert!(QuestionType::Date.is_answered(Some(&AnswerValue::Text("2026-10-19".into()))));
        assert!(QuestionType::Number.is_answered(Some(&AnswerValue::Text("42".into()))));
        assert!(QuestionType::Number.is_answered(Some(&AnswerValue::Number(0.0))));
        assert!(QuestionType::Boolean.is_answered(Some(&AnswerValue::Flag(false))));
        assert!(!QuestionType::MultiSelect.is_answered(Some(&AnswerValue::Choices(vec![]))));
        assert!(QuestionType::MultiSelect.is_answered(Some(&AnswerValue::Choices(vec!["a".into()]))));
        assert!(QuestionType::File.is_answered(Some(&AnswerValue::File(FileHandle::new("plan.pdf", 10)))));
    }

    #[test]
    fn test_mismatched_shape_is_unanswered() {
        assert!(!QuestionType::MultiSelect.is_answered(Some(&AnswerValue::Text("a".into()))));
        assert!(!QuestionType::Boolean.is_answered(Some(&AnswerValue::Text("true".into()))));
        assert!(!QuestionType::Select.is_answered(Some(&AnswerValue::Choices(vec!["a".into()]))));
    }

    #[test]
    fn test_question_defaults_from_minimal_json() {
        let question: Question = serde_json::from_value(serde_json::json!({
            "id": 3,
            "key": "rooms",
            "label": "How many rooms?",
            "question_type": "number"
        }))
        .unwrap();

        assert!(!question.is_required);
        assert_eq!(question.sort_order, 0);
        assert!(question.options.is_none());
        assert!(!question.is_synthetic());
    }
}
