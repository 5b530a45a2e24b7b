use mestermind_forms::{adapt_questions, QuestionSetResolution};
use mestermind_types::{Question, QuestionSet};
use serde_json::json;

use super::AppContext;
use crate::cli::OutputFormat;
use crate::error::CliError;

pub async fn show_question_set(
    app: &AppContext,
    service_id: i64,
    format: OutputFormat,
) -> Result<(), CliError> {
    let resolution = app.drafts().resolve_question_set(service_id).await?;

    let output = match (&resolution, format) {
        (QuestionSetResolution::Published(set), OutputFormat::Json) => {
            serde_json::to_string_pretty(&json!({
                "question_set_id": set.id,
                "name": set.name,
                "version": set.version,
                "questions": adapt_questions(set),
            }))?
        }
        (QuestionSetResolution::Published(set), OutputFormat::Text) => {
            render_text(set, &adapt_questions(set))
        }
        (QuestionSetResolution::NonePublished, OutputFormat::Json) => {
            serde_json::to_string_pretty(&json!({ "question_set_id": null, "questions": [] }))?
        }
        (QuestionSetResolution::NonePublished, OutputFormat::Text) => {
            format!("Service {service_id} has no published question set.")
        }
    };
    println!("{output}");
    Ok(())
}

fn render_text(set: &QuestionSet, questions: &[Question]) -> String {
    let mut out = format!("{} (v{}, #{})\n", set.name, set.version, set.id);
    for (i, question) in questions.iter().enumerate() {
        let required = if question.is_required { " *" } else { "" };
        let added = if question.is_synthetic() { " [added]" } else { "" };
        out.push_str(&format!(
            "{:>2}. {}{required} ({:?}){added}\n",
            i + 1,
            question.label,
            question.question_type
        ));
        let options: &[String] = question.options.as_deref().unwrap_or(&[]);
        if !options.is_empty() {
            out.push_str(&format!("    options: {}\n", options.join(" | ")));
        }
    }
    out.trim_end().to_string()
}
