//! Terminal prompts for each question type and for the trailing steps.
//!
//! dialoguer blocks on the terminal, so every prompt runs on the blocking pool.

use dialoguer::{Input, MultiSelect, Select};
use mestermind_types::{
    minutes_since_midnight, AnswerValue, Availability, ContactDetails, FileHandle, Question,
    QuestionType, Weekday,
};
use std::path::Path;

use crate::error::CliError;

const SKIP: &str = "(skip)";

pub async fn blocking<T, F>(prompt: F) -> Result<T, CliError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CliError> + Send + 'static,
{
    tokio::task::spawn_blocking(prompt)
        .await
        .map_err(|e| CliError::Prompt(format!("Prompt task failed: {e}")))?
}

/// Parses typed input for the free-form question types. Empty input means no answer.
pub fn parse_typed_answer(
    question_type: QuestionType,
    input: &str,
) -> Result<Option<AnswerValue>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    match question_type {
        QuestionType::Number => input
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(|n| Some(AnswerValue::Number(n)))
            .ok_or_else(|| format!("'{input}' is not a number")),
        QuestionType::Date => chrono::NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .map(|date| Some(AnswerValue::Text(date.format("%Y-%m-%d").to_string())))
            .map_err(|_| "Use the YYYY-MM-DD format".to_string()),
        _ => Ok(Some(AnswerValue::text(input))),
    }
}

/// Describes a local file as an upload handle
pub fn file_handle(path: &Path) -> Result<FileHandle, String> {
    let metadata = std::fs::metadata(path).map_err(|e| format!("{}: {e}", path.display()))?;
    if !metadata.is_file() {
        return Err(format!("{} is not a file", path.display()));
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| format!("{} has no file name", path.display()))?;
    Ok(FileHandle::new(name, metadata.len()))
}

fn with_label(question: &Question) -> String {
    let mut prompt = question.label.clone();
    if question.is_required {
        prompt.push_str(" *");
    }
    prompt
}

/// Asks `question`, offering `current` as the starting value.
/// `Ok(None)` clears the answer.
pub fn ask_question(
    question: &Question,
    current: Option<&AnswerValue>,
) -> Result<Option<AnswerValue>, CliError> {
    if let Some(description) = &question.description {
        println!("  {description}");
    }
    let prompt = with_label(question);
    let options: &[String] = question.options.as_deref().unwrap_or(&[]);

    match question.question_type {
        QuestionType::Boolean => {
            let mut items = vec!["Yes", "No"];
            if !question.is_required {
                items.push(SKIP);
            }
            let default = match current {
                Some(AnswerValue::Flag(false)) => 1,
                _ => 0,
            };
            let picked = Select::new()
                .with_prompt(prompt)
                .items(&items)
                .default(default)
                .interact()?;
            Ok(match picked {
                0 => Some(AnswerValue::Flag(true)),
                1 => Some(AnswerValue::Flag(false)),
                _ => None,
            })
        }
        QuestionType::Select | QuestionType::MultiSelect if options.is_empty() => {
            println!("  (no options to choose from)");
            Ok(None)
        }
        QuestionType::Select => {
            let mut items = options.to_vec();
            if !question.is_required {
                items.push(SKIP.to_string());
            }
            let default = current
                .and_then(AnswerValue::as_text)
                .and_then(|text| items.iter().position(|o| o == text))
                .unwrap_or(0);
            let picked = Select::new()
                .with_prompt(prompt)
                .items(&items)
                .default(default)
                .interact()?;
            Ok(options
                .get(picked)
                .map(|choice| AnswerValue::text(choice.clone())))
        }
        QuestionType::MultiSelect => {
            let chosen: Vec<String> = match current {
                Some(AnswerValue::Choices(values)) => values.clone(),
                _ => Vec::new(),
            };
            let defaults: Vec<bool> = options
                .iter()
                .map(|o| chosen.contains(o))
                .collect();
            let picked = MultiSelect::new()
                .with_prompt(prompt)
                .items(options)
                .defaults(&defaults)
                .interact()?;
            if picked.is_empty() {
                return Ok(None);
            }
            Ok(Some(AnswerValue::choices(
                picked.into_iter().map(|i| options[i].clone()),
            )))
        }
        QuestionType::File => {
            let initial = match current {
                Some(AnswerValue::File(file)) => file.name.clone(),
                _ => String::new(),
            };
            let raw: String = Input::new()
                .with_prompt(format!("{prompt} (path)"))
                .with_initial_text(initial)
                .allow_empty(!question.is_required)
                .validate_with(|input: &String| -> Result<(), String> {
                    if input.trim().is_empty() {
                        return Ok(());
                    }
                    file_handle(Path::new(input.trim())).map(|_| ())
                })
                .interact_text()?;
            if raw.trim().is_empty() {
                return Ok(None);
            }
            file_handle(Path::new(raw.trim()))
                .map(|handle| Some(AnswerValue::File(handle)))
                .map_err(CliError::Prompt)
        }
        question_type => {
            let initial = current.map(AnswerValue::display).unwrap_or_default();
            let hint = match question_type {
                QuestionType::Date => " (YYYY-MM-DD)",
                _ => "",
            };
            let raw: String = Input::new()
                .with_prompt(format!("{prompt}{hint}"))
                .with_initial_text(initial)
                .allow_empty(!question.is_required)
                .validate_with(|input: &String| -> Result<(), String> {
                    parse_typed_answer(question_type, input).map(|_| ())
                })
                .interact_text()?;
            parse_typed_answer(question_type, &raw).map_err(CliError::Prompt)
        }
    }
}

fn time_input(prompt: &str, initial: &str) -> Result<String, CliError> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .validate_with(|input: &String| -> Result<(), &str> {
            minutes_since_midnight(input.trim())
                .map(|_| ())
                .ok_or("Use the HH:MM format")
        })
        .interact_text()?;
    Ok(value.trim().to_string())
}

/// Picks weekdays and a daily window; no days means no preference
pub fn ask_availability(current: Option<&Availability>) -> Result<Option<Availability>, CliError> {
    let labels: Vec<&str> = Weekday::ALL.iter().map(|d| d.label()).collect();
    let defaults: Vec<bool> = Weekday::ALL
        .iter()
        .map(|d| current.is_some_and(|a| a.days.contains(d)))
        .collect();
    let picked = MultiSelect::new()
        .with_prompt("Which days suit you? (none for no preference)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;
    if picked.is_empty() {
        return Ok(None);
    }

    let start = time_input("From", current.map_or("08:00", |a| a.start_time.as_str()))?;
    let end = time_input("Until", current.map_or("17:00", |a| a.end_time.as_str()))?;
    Ok(Some(Availability::new(
        picked.into_iter().map(|i| Weekday::ALL[i]),
        start,
        end,
    )))
}

fn text_input(prompt: &str, initial: &str) -> Result<String, CliError> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()?;
    Ok(value)
}

pub fn ask_contact(current: &ContactDetails) -> Result<ContactDetails, CliError> {
    println!("  An email address or phone number is required.");
    Ok(ContactDetails {
        first_name: text_input("First name", &current.first_name)?,
        last_name: text_input("Last name", &current.last_name)?,
        email: text_input("Email", &current.email)?,
        phone: text_input("Phone", &current.phone)?,
        postal_code: text_input("Postal code", &current.postal_code)?,
    })
}

pub fn ask_message(current: &str) -> Result<String, CliError> {
    text_input("Message to the professional (optional)", current)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavChoice {
    Next,
    Submit,
    Back,
    Edit,
    Quit,
}

impl NavChoice {
    fn label(&self) -> &'static str {
        match self {
            NavChoice::Next => "Next",
            NavChoice::Submit => "Submit request",
            NavChoice::Back => "Back",
            NavChoice::Edit => "Edit this step",
            NavChoice::Quit => "Quit and discard",
        }
    }
}

/// Menu entries shown below a step
pub fn nav_choices(is_first: bool, is_last: bool) -> Vec<NavChoice> {
    let mut choices = vec![if is_last { NavChoice::Submit } else { NavChoice::Next }];
    if !is_first {
        choices.push(NavChoice::Back);
    }
    choices.push(NavChoice::Edit);
    choices.push(NavChoice::Quit);
    choices
}

pub fn ask_navigation(is_first: bool, is_last: bool) -> Result<NavChoice, CliError> {
    let choices = nav_choices(is_first, is_last);
    let labels: Vec<&str> = choices.iter().map(NavChoice::label).collect();
    let picked = Select::new()
        .with_prompt("What next?")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(choices[picked])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_typed_answers() {
        assert_eq!(parse_typed_answer(QuestionType::Text, "  "), Ok(None));
        assert_eq!(
            parse_typed_answer(QuestionType::Text, " Kitchen "),
            Ok(Some(AnswerValue::text("Kitchen")))
        );
        assert_eq!(
            parse_typed_answer(QuestionType::Number, "12,5"),
            Ok(Some(AnswerValue::Number(12.5)))
        );
        assert!(parse_typed_answer(QuestionType::Number, "twelve").is_err());
        for non_finite in ["NaN", "inf", "-infinity"] {
            assert!(parse_typed_answer(QuestionType::Number, non_finite).is_err());
        }
        assert_eq!(
            parse_typed_answer(QuestionType::Date, "2026-11-03"),
            Ok(Some(AnswerValue::text("2026-11-03")))
        );
        assert!(parse_typed_answer(QuestionType::Date, "03/11/2026").is_err());
    }

    #[test]
    fn test_file_handle_reads_size() {
        let mut file = NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"floor plan").unwrap();

        let handle = file_handle(file.path()).unwrap();
        assert_eq!(handle.size, 10);
        assert!(file_handle(Path::new("/definitely/not/here.pdf")).is_err());
    }

    #[test]
    fn test_navigation_menu() {
        assert_eq!(
            nav_choices(true, false),
            vec![NavChoice::Next, NavChoice::Edit, NavChoice::Quit]
        );
        assert_eq!(
            nav_choices(false, true),
            vec![NavChoice::Submit, NavChoice::Back, NavChoice::Edit, NavChoice::Quit]
        );
    }
}
