use mestermind_forms::{QuestionSetResolution, RequestContext};

use super::AppContext;
use crate::error::CliError;

#[derive(Debug, Default, PartialEq, Eq)]
struct StatusReport {
    question_set_id: Option<i64>,
    draft_id: Option<i64>,
    pending_return_to: Option<String>,
    submitted: bool,
}

impl StatusReport {
    fn lines(&self) -> Vec<String> {
        let mut lines = vec![match self.question_set_id {
            Some(id) => format!("Question set: #{id}"),
            None => "Question set: none published".to_string(),
        }];
        lines.push(match self.draft_id {
            Some(id) => format!("Draft: #{id}"),
            None => "Draft: none".to_string(),
        });
        if let Some(return_to) = &self.pending_return_to {
            lines.push(format!("Waiting for sign-in, then back to {return_to}"));
        }
        lines.push(format!(
            "Submitted: {}",
            if self.submitted { "yes" } else { "no" }
        ));
        lines
    }
}

pub async fn show_status(
    app: &AppContext,
    context: RequestContext,
    acknowledge: bool,
) -> Result<(), CliError> {
    let drafts = app.drafts();
    let finalizer = app.finalizer();

    let question_set_id = match drafts.resolve_question_set(context.service_id).await? {
        QuestionSetResolution::Published(set) => Some(set.id),
        QuestionSetResolution::NonePublished => None,
    };
    let report = StatusReport {
        question_set_id,
        draft_id: drafts.stored_draft_id(&context, question_set_id).await?,
        pending_return_to: finalizer.pending_return_to(&context).await?,
        submitted: finalizer.is_submitted(&context).await?,
    };

    for line in report.lines() {
        println!("{line}");
    }
    if acknowledge && report.submitted {
        finalizer.acknowledge_submitted(&context).await?;
        println!("Submitted flag cleared.");
    }
    Ok(())
}
