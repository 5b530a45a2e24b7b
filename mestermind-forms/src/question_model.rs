//! Turns a fetched question set into the ordered list the flow renders.

use mestermind_types::{AnswerValue, Question, QuestionSet, QuestionType};
use std::fmt;

pub const TIMELINE_KEY: &str = "timeline";
pub const TIMELINE_QUESTION_ID: i64 = -1;
pub const TIMELINE_LABEL: &str = "When would you like the work to start?";
pub const TIMELINE_CHOICES: [&str; 3] = [
    "As soon as possible",
    "Within the next few weeks",
    "I'm flexible",
];

/// The question every flow ends with when the set does not ask it itself
pub fn timeline_question(sort_order: i32) -> Question {
    Question::new(
        TIMELINE_QUESTION_ID,
        TIMELINE_KEY,
        TIMELINE_LABEL,
        QuestionType::Select,
    )
    .with_options(TIMELINE_CHOICES)
    .with_sort_order(sort_order)
}

/// Questions of `set` ordered by `sort_order`, with the timeline question
/// appended when the set lacks one.
pub fn adapt_questions(set: &QuestionSet) -> Vec<Question> {
    adapt_question_list(&set.questions)
}

/// Same as [`adapt_questions`] for a bare list; adapting an adapted list is a no-op.
pub fn adapt_question_list(questions: &[Question]) -> Vec<Question> {
    let mut adapted = questions.to_vec();
    adapted.sort_by_key(|q| q.sort_order);

    if !adapted.iter().any(|q| q.key == TIMELINE_KEY) {
        let next_order = adapted
            .iter()
            .map(|q| q.sort_order)
            .max()
            .map_or(0, |max| max.saturating_add(1));
        adapted.push(timeline_question(next_order));
    }

    adapted
}

/// Advisory bound violations; shown next to the input, never blocking navigation
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintHint {
    TooShort { min: u32 },
    TooLong { max: u32 },
    NotANumber,
    BelowMinimum { min: f64 },
    AboveMaximum { max: f64 },
    UnknownChoice(String),
    FileTypeNotAllowed(String),
    FileTooLarge { max: u64 },
}

impl fmt::Display for ConstraintHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintHint::TooShort { min } => write!(f, "Use at least {min} characters"),
            ConstraintHint::TooLong { max } => write!(f, "Use at most {max} characters"),
            ConstraintHint::NotANumber => write!(f, "Enter a number"),
            ConstraintHint::BelowMinimum { min } => write!(f, "Must be at least {min}"),
            ConstraintHint::AboveMaximum { max } => write!(f, "Must be at most {max}"),
            ConstraintHint::UnknownChoice(choice) => write!(f, "'{choice}' is not one of the options"),
            ConstraintHint::FileTypeNotAllowed(name) => write!(f, "File type of '{name}' is not allowed"),
            ConstraintHint::FileTooLarge { max } => write!(f, "File must be at most {max} bytes"),
        }
    }
}

pub fn constraint_hints(question: &Question, value: &AnswerValue) -> Vec<ConstraintHint> {
    let mut hints = Vec::new();

    match (question.question_type, value) {
        (QuestionType::Text, AnswerValue::Text(text)) => {
            let len = text.trim().chars().count() as u32;
            if let Some(min) = question.min_length {
                if len < min {
                    hints.push(ConstraintHint::TooShort { min });
                }
            }
            if let Some(max) = question.max_length {
                if len > max {
                    hints.push(ConstraintHint::TooLong { max });
                }
            }
        }
        (QuestionType::Number, AnswerValue::Text(text)) if !text.trim().is_empty() => {
            match parse_number(text) {
                Some(n) => check_range(question, n, &mut hints),
                None => hints.push(ConstraintHint::NotANumber),
            }
        }
        (QuestionType::Number, AnswerValue::Number(n)) => check_range(question, *n, &mut hints),
        (QuestionType::Select, AnswerValue::Text(choice)) if !choice.trim().is_empty() => {
            if !is_known_choice(question, choice) {
                hints.push(ConstraintHint::UnknownChoice(choice.clone()));
            }
        }
        (QuestionType::MultiSelect, AnswerValue::Choices(choices)) => {
            for choice in choices {
                if !is_known_choice(question, choice) {
                    hints.push(ConstraintHint::UnknownChoice(choice.clone()));
                }
            }
        }
        (QuestionType::File, AnswerValue::File(file)) => {
            if let Some(allowed) = &question.allowed_file_types {
                let accepted = allowed.iter().any(|pattern| {
                    file_type_matches(pattern, file.extension().as_deref(), file.content_type.as_deref())
                });
                if !allowed.is_empty() && !accepted {
                    hints.push(ConstraintHint::FileTypeNotAllowed(file.name.clone()));
                }
            }
            if let Some(max) = question.max_file_size {
                if file.size > max {
                    hints.push(ConstraintHint::FileTooLarge { max });
                }
            }
        }
        _ => {}
    }

    hints
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

fn check_range(question: &Question, value: f64, hints: &mut Vec<ConstraintHint>) {
    if let Some(min) = question.min_value {
        if value < min {
            hints.push(ConstraintHint::BelowMinimum { min });
        }
    }
    if let Some(max) = question.max_value {
        if value > max {
            hints.push(ConstraintHint::AboveMaximum { max });
        }
    }
}

// Questions without declared options accept anything.
fn is_known_choice(question: &Question, choice: &str) -> bool {
    match &question.options {
        Some(options) if !options.is_empty() => options.iter().any(|o| o == choice),
        _ => true,
    }
}

fn file_type_matches(pattern: &str, extension: Option<&str>, content_type: Option<&str>) -> bool {
    let pattern = pattern.trim().to_ascii_lowercase();
    if let Some(prefix) = pattern.strip_suffix("/*") {
        return content_type
            .map(|ct| ct.to_ascii_lowercase().starts_with(&format!("{prefix}/")))
            .unwrap_or(false);
    }
    if pattern.contains('/') {
        return content_type
            .map(|ct| ct.eq_ignore_ascii_case(&pattern))
            .unwrap_or(false);
    }
    extension == Some(pattern.trim_start_matches('.'))
}
