//! Interactive quote request walkthrough

use mestermind_forms::{
    ExtraStep, FlowError, FlowVariant, Persistence, QuoteRequestSession, RequestContext,
    StepView, SubmitOutcome,
};
use mestermind_types::Question;

use super::prompts::{self, blocking, NavChoice};
use super::AppContext;
use crate::error::CliError;

enum StepContent {
    Questions(Vec<Question>),
    Extra(ExtraStep),
}

pub async fn run_request(
    app: &AppContext,
    context: RequestContext,
    variant: FlowVariant,
) -> Result<(), CliError> {
    let mut session = QuoteRequestSession::open(app.session_deps(), context, variant).await?;

    if let Some(outcome) = session.resume_pending_submission().await? {
        println!("{}", describe_outcome(&outcome, &app.config.api.base_url));
        if session.is_closed() {
            return Ok(());
        }
    }
    if session.no_published_question_set() {
        println!("This service has no questions yet; we only need your details.");
    }

    loop {
        println!(
            "\nStep {}/{} ({:.0}%)",
            session.current_step() + 1,
            session.total_steps(),
            session.progress() * 100.0
        );
        fill_step(&mut session).await?;

        for (key, hint) in session.constraint_hints() {
            println!("  note on {key}: {hint}");
        }

        let is_first = session.current_step() == 0;
        let is_last = session.is_last_step();
        let choice = blocking(move || prompts::ask_navigation(is_first, is_last)).await?;

        match choice {
            NavChoice::Next => match session.next().await {
                Ok(change) => report_persistence(&change.persistence),
                Err(FlowError::StepIncomplete { .. }) => explain_incomplete(&session),
                Err(e) => return Err(e.into()),
            },
            NavChoice::Back => {
                let change = session.back().await?;
                report_persistence(&change.persistence);
            }
            NavChoice::Edit => {}
            NavChoice::Submit => match session.submit().await {
                Ok(outcome) => {
                    println!("{}", describe_outcome(&outcome, &app.config.api.base_url));
                    if !matches!(outcome, SubmitOutcome::SavedAsDraft(_)) {
                        return Ok(());
                    }
                }
                Err(FlowError::StepIncomplete { .. }) => explain_incomplete(&session),
                Err(e) => return Err(e.into()),
            },
            NavChoice::Quit => {
                let closed = session.close().await?;
                if closed.abandoned {
                    println!("Request discarded.");
                } else {
                    println!("Draft kept for when you come back.");
                }
                return Ok(());
            }
        }
    }
}

async fn fill_step(session: &mut QuoteRequestSession) -> Result<(), CliError> {
    let content = match session.view() {
        StepView::Questions(questions) => StepContent::Questions(questions.to_vec()),
        StepView::Extra(extra) => StepContent::Extra(extra),
    };

    match content {
        StepContent::Questions(questions) => {
            for question in questions {
                let key = question.key.clone();
                let current = session.answers().get(&key).cloned();
                let answer =
                    blocking(move || prompts::ask_question(&question, current.as_ref())).await?;
                match answer {
                    Some(value) => session.set_answer(&key, value)?,
                    None => session.clear_answer(&key)?,
                }
            }
        }
        StepContent::Extra(extra) => {
            println!("{}", extra.title());
            match extra {
                ExtraStep::Availability => {
                    let current = session.details().availability.clone();
                    let availability =
                        blocking(move || prompts::ask_availability(current.as_ref())).await?;
                    if availability.as_ref().is_some_and(|a| !a.is_valid()) {
                        println!("  The end time must be after the start time.");
                    }
                    session.set_availability(availability)?;
                }
                ExtraStep::Contact => {
                    let current = session.details().contact.clone();
                    let contact = blocking(move || prompts::ask_contact(&current)).await?;
                    session.set_contact(contact)?;
                }
                ExtraStep::Message => {
                    let current = session.details().message_to_pro.clone();
                    let message = blocking(move || prompts::ask_message(&current)).await?;
                    session.set_message(message)?;
                }
            }
        }
    }
    Ok(())
}

fn explain_incomplete(session: &QuoteRequestSession) {
    let missing: Vec<&str> = session
        .missing_required()
        .into_iter()
        .map(|q| q.label.as_str())
        .collect();
    if missing.is_empty() {
        match session.view() {
            StepView::Extra(ExtraStep::Contact) => {
                println!("Please leave an email address or a phone number.")
            }
            _ => println!("Please complete this step first."),
        }
    } else {
        println!("Still needed: {}", missing.join(", "));
    }
}

fn report_persistence(persistence: &Persistence) {
    if let Persistence::Failed(reason) = persistence {
        println!("(Progress not saved yet: {reason})");
    }
}

pub fn describe_outcome(outcome: &SubmitOutcome, base_url: &str) -> String {
    match outcome {
        SubmitOutcome::Submitted(request) => format!(
            "Request #{} sent. Professionals will get back to you soon.",
            request.id
        ),
        SubmitOutcome::SavedAsDraft(request) => format!(
            "Request #{} saved as a draft; add contact details to send it.",
            request.id
        ),
        SubmitOutcome::SignInRequired {
            sign_in_path,
            return_to,
        } => {
            let origin = base_url
                .trim_end_matches('/')
                .trim_end_matches("/api/v1");
            format!(
                "Sign in at {origin}{sign_in_path}, then run this command again with --token. \
                 Your answers are kept (return to {return_to})."
            )
        }
    }
}
