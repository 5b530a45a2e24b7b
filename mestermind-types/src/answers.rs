use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

/// Answers keyed by question key
pub type Answers = BTreeMap<String, AnswerValue>;

/// Reference to a file picked for a `file` question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct FileHandle {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub content_type: Option<String>,
    pub size: u64,
    /// Location after upload, absent while the file is local only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub url: Option<String>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            size,
            url: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Lowercased extension of the file name, if any
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

/// Value of a single answer.
///
/// The wire format is the plain JSON value the backend stores, so the enum is
/// untagged. Anything that does not fit a known shape (including `null`) is
/// kept verbatim in `Other` so it round-trips unchanged on autosave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
pub enum AnswerValue {
    Flag(bool),
    Number(f64),
    Text(String),
    Choices(Vec<String>),
    File(FileHandle),
    Other(serde_json::Value),
}

impl AnswerValue {
    pub fn text(value: impl Into<String>) -> Self {
        AnswerValue::Text(value.into())
    }

    pub fn choices<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AnswerValue::Choices(values.into_iter().map(Into::into).collect())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short human readable rendering, used by terminal hosts and logs
    pub fn display(&self) -> String {
        match self {
            AnswerValue::Flag(true) => "yes".to_string(),
            AnswerValue::Flag(false) => "no".to_string(),
            AnswerValue::Number(n) => n.to_string(),
            AnswerValue::Text(s) => s.clone(),
            AnswerValue::Choices(c) => c.join(", "),
            AnswerValue::File(f) => f.name.clone(),
            AnswerValue::Other(v) => v.to_string(),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        AnswerValue::Flag(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        AnswerValue::Choices(value)
    }
}

impl From<FileHandle> for AnswerValue {
    fn from(value: FileHandle) -> Self {
        AnswerValue::File(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_answers_from_backend_json() {
        let answers: Answers = serde_json::from_value(json!({
            "area": "45",
            "urgent": true,
            "rooms": 3,
            "extras": ["painting", "tiling"],
            "photo": {"name": "wall.jpg", "size": 2048},
            "legacy": null
        }))
        .unwrap();

        assert_eq!(answers["area"], AnswerValue::text("45"));
        assert_eq!(answers["urgent"], AnswerValue::Flag(true));
        assert_eq!(answers["rooms"], AnswerValue::Number(3.0));
        assert_eq!(answers["extras"], AnswerValue::choices(["painting", "tiling"]));
        assert_eq!(answers["photo"], AnswerValue::File(FileHandle::new("wall.jpg", 2048)));
        assert_eq!(answers["legacy"], AnswerValue::Other(serde_json::Value::Null));
    }

    #[test]
    fn test_unknown_shapes_survive_serialization() {
        let raw = json!({"nested": {"a": 1}});
        let answers: Answers = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&answers).unwrap(), raw);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(FileHandle::new("Plan.PDF", 1).extension().as_deref(), Some("pdf"));
        assert_eq!(FileHandle::new("README", 1).extension(), None);
        assert_eq!(FileHandle::new("trailing.", 1).extension(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(AnswerValue::Flag(true).display(), "yes");
        assert_eq!(AnswerValue::choices(["a", "b"]).display(), "a, b");
    }
}
