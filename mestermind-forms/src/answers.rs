use mestermind_types::{AnswerValue, Answers};

/// Current answers of a flow.
///
/// Writes only ever merge a single key; the map is never swapped out after
/// the store has been seeded from a resumed draft.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerStore {
    answers: Answers,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(answers: Answers) -> Self {
        Self { answers }
    }

    pub fn merge(&mut self, key: impl Into<String>, value: AnswerValue) {
        self.answers.insert(key.into(), value);
    }

    /// Drops the answer for `key`, returning what was there
    pub fn clear(&mut self, key: &str) -> Option<AnswerValue> {
        self.answers.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.answers.get(key)
    }

    pub fn as_map(&self) -> &Answers {
        &self.answers
    }

    /// Owned copy handed to persistence
    pub fn snapshot(&self) -> Answers {
        self.answers.clone()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}
