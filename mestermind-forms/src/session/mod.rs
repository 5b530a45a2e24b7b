//! One customer's pass through a quote-request flow, from opening the form
//! to submitting or abandoning it.

use mestermind_client::MarketplaceApi;
use mestermind_types::{
    AnswerValue, Answers, Availability, ContactDetails, CustomerRequest, CustomerRequestUpdate,
    Question, RequestDetails,
};
use std::sync::Arc;
use std::time::Duration;

use crate::answers::AnswerStore;
use crate::auth::{AuthProvider, SubmitPolicy};
use crate::autosave::{Autosaver, DEFAULT_AUTOSAVE_DELAY};
use crate::drafts::{DraftPersistence, QuestionSetResolution, RequestContext};
use crate::error::FlowError;
use crate::finalizer::{FinalState, PendingSubmission, SubmissionFinalizer, SubmitOutcome};
use crate::question_model::{adapt_questions, constraint_hints, ConstraintHint};
use crate::steps::{FlowVariant, StepSequencer, StepView};
use crate::storage::{KeySpace, SessionStore};


#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub autosave_delay: Duration,
    pub keys: KeySpace,
    pub submit: SubmitPolicy,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            autosave_delay: DEFAULT_AUTOSAVE_DELAY,
            keys: KeySpace::default(),
            submit: SubmitPolicy::default(),
        }
    }
}

/// Ports the session talks to
#[derive(Clone)]
pub struct SessionDeps {
    pub api: Arc<dyn MarketplaceApi>,
    pub store: Arc<dyn SessionStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub settings: FlowSettings,
}

/// Result of the write that follows a step change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    Confirmed,
    /// The step still changed locally; the next write carries the state again
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepChange {
    pub step: usize,
    pub persistence: Persistence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseOutcome {
    /// A draft delete was attempted
    pub abandoned: bool,
    /// The backend confirmed the delete
    pub deleted: bool,
}

pub struct QuoteRequestSession {
    context: RequestContext,
    drafts: DraftPersistence,
    finalizer: SubmissionFinalizer,
    auth: Arc<dyn AuthProvider>,
    policy: SubmitPolicy,
    question_set_id: Option<i64>,
    no_published_question_set: bool,
    sequencer: StepSequencer,
    answers: AnswerStore,
    details: RequestDetails,
    request: CustomerRequest,
    writer: Autosaver,
    closed: bool,
}

impl QuoteRequestSession {
    /// Resolves the question set, resumes or creates the draft and restores
    /// its answers and step.
    pub async fn open(
        deps: SessionDeps,
        context: RequestContext,
        variant: FlowVariant,
    ) -> Result<Self, FlowError> {
        let drafts = DraftPersistence::new(
            deps.api.clone(),
            deps.store.clone(),
            deps.settings.keys.clone(),
        );

        let (questions, question_set_id) =
            match drafts.resolve_question_set(context.service_id).await? {
                QuestionSetResolution::Published(set) => (adapt_questions(&set), Some(set.id)),
                QuestionSetResolution::NonePublished => (Vec::new(), None),
            };
        let no_published_question_set = question_set_id.is_none();

        let request = drafts.resume_or_create(&context, question_set_id).await?;

        let mut sequencer = StepSequencer::new(variant, questions);
        if no_published_question_set {
            sequencer.set_current_step(sequencer.first_extra_step());
        } else {
            sequencer.set_current_step(request.current_step);
        }

        let details = RequestDetails {
            availability: request.availability.clone(),
            contact: request.contact(),
            message_to_pro: request.message_to_pro.clone().unwrap_or_default(),
        };

        tracing::info!(
            request_id = request.id,
            service_id = context.service_id,
            question_set_id = ?question_set_id,
            step = sequencer.current_step(),
            total_steps = sequencer.total_steps(),
            "Quote request flow opened"
        );

        Ok(Self {
            writer: Autosaver::new(deps.api.clone(), request.id, deps.settings.autosave_delay),
            finalizer: SubmissionFinalizer::new(deps.store.clone(), deps.settings.keys.clone()),
            answers: AnswerStore::seeded(request.answers.clone()),
            auth: deps.auth,
            policy: deps.settings.submit,
            context,
            drafts,
            question_set_id,
            no_published_question_set,
            sequencer,
            details,
            request,
            closed: false,
        })
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub fn variant(&self) -> FlowVariant {
        self.sequencer.variant()
    }

    /// Last server-confirmed state of the draft
    pub fn request(&self) -> &CustomerRequest {
        &self.request
    }

    pub fn question_set_id(&self) -> Option<i64> {
        self.question_set_id
    }

    pub fn no_published_question_set(&self) -> bool {
        self.no_published_question_set
    }

    pub fn questions(&self) -> &[Question] {
        self.sequencer.questions()
    }

    pub fn current_step(&self) -> usize {
        self.sequencer.current_step()
    }

    pub fn base_total_steps(&self) -> usize {
        self.sequencer.base_total_steps()
    }

    pub fn total_steps(&self) -> usize {
        self.sequencer.total_steps()
    }

    pub fn progress(&self) -> f64 {
        self.sequencer.progress()
    }

    pub fn is_last_step(&self) -> bool {
        self.sequencer.is_last_step()
    }

    pub fn view(&self) -> StepView<'_> {
        self.sequencer.view()
    }

    pub fn answers(&self) -> &Answers {
        self.answers.as_map()
    }

    pub fn details(&self) -> &RequestDetails {
        &self.details
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_current_step_valid(&self) -> bool {
        self.sequencer
            .is_current_step_valid(self.answers.as_map(), &self.details)
    }

    /// Required questions on the current step still waiting for an answer
    pub fn missing_required(&self) -> Vec<&Question> {
        self.sequencer
            .missing_required(self.sequencer.current_step(), self.answers.as_map())
    }

    /// Advisory bound violations for the questions on the current step
    pub fn constraint_hints(&self) -> Vec<(String, ConstraintHint)> {
        let StepView::Questions(questions) = self.sequencer.view() else {
            return Vec::new();
        };
        questions
            .iter()
            .filter_map(|q| self.answers.get(&q.key).map(|value| (q, value)))
            .flat_map(|(q, value)| {
                constraint_hints(q, value)
                    .into_iter()
                    .map(move |hint| (q.key.clone(), hint))
            })
            .collect()
    }

    fn ensure_open(&self) -> Result<(), FlowError> {
        if self.closed {
            Err(FlowError::Closed)
        } else {
            Ok(())
        }
    }

    /// Merges one answer and schedules a debounced autosave
    pub fn set_answer(&mut self, key: &str, value: AnswerValue) -> Result<(), FlowError> {
        self.ensure_open()?;
        if self.sequencer.question(key).is_none() {
            return Err(FlowError::UnknownQuestion(key.to_string()));
        }
        self.answers.merge(key, value);
        self.writer.schedule(self.answers.snapshot());
        Ok(())
    }

    pub fn clear_answer(&mut self, key: &str) -> Result<(), FlowError> {
        self.ensure_open()?;
        if self.answers.clear(key).is_some() {
            self.writer.schedule(self.answers.snapshot());
        }
        Ok(())
    }

    pub fn set_contact(&mut self, contact: ContactDetails) -> Result<(), FlowError> {
        self.ensure_open()?;
        self.details.contact = contact;
        Ok(())
    }

    pub fn set_message(&mut self, message: impl Into<String>) -> Result<(), FlowError> {
        self.ensure_open()?;
        self.details.message_to_pro = message.into();
        Ok(())
    }

    pub fn set_availability(&mut self, availability: Option<Availability>) -> Result<(), FlowError> {
        self.ensure_open()?;
        self.details.availability = availability;
        Ok(())
    }

    /// Moves forward once the current step is complete and persists the step,
    /// answers and denormalized request details.
    pub async fn next(&mut self) -> Result<StepChange, FlowError> {
        self.ensure_open()?;
        if self.sequencer.is_last_step() {
            return Err(FlowError::AtFinalStep);
        }
        if !self.is_current_step_valid() {
            return Err(FlowError::StepIncomplete {
                step: self.sequencer.current_step(),
            });
        }

        let step = self.sequencer.advance();
        let update = CustomerRequestUpdate::new()
            .current_step(step)
            .answers(self.answers.snapshot())
            .contact(&self.details.contact)
            .message_to_pro(self.details.message_to_pro.trim())
            .availability(self.details.availability.clone());
        let persistence = self.persist(update).await;

        Ok(StepChange { step, persistence })
    }

    /// Moves back one step (never below the first) and persists step and answers
    pub async fn back(&mut self) -> Result<StepChange, FlowError> {
        self.ensure_open()?;
        let step = self.sequencer.retreat();
        let update = CustomerRequestUpdate::new()
            .current_step(step)
            .answers(self.answers.snapshot());
        let persistence = self.persist(update).await;

        Ok(StepChange { step, persistence })
    }

    async fn persist(&mut self, update: CustomerRequestUpdate) -> Persistence {
        match self.writer.write_through(update).await {
            Ok(request) => {
                self.request = request;
                Persistence::Confirmed
            }
            Err(e) => {
                tracing::warn!(
                    request_id = self.request.id,
                    step = self.sequencer.current_step(),
                    error = %e,
                    "Failed to persist step change"
                );
                Persistence::Failed(e.to_string())
            }
        }
    }

    /// Submits from the final step, or defers to sign-in when required
    pub async fn submit(&mut self) -> Result<SubmitOutcome, FlowError> {
        self.ensure_open()?;
        if !self.sequencer.is_last_step() {
            return Err(FlowError::NotOnFinalStep {
                current: self.sequencer.current_step(),
                last: self.sequencer.last_step(),
            });
        }
        if !self.is_current_step_valid() {
            return Err(FlowError::StepIncomplete {
                step: self.sequencer.current_step(),
            });
        }

        if !self.policy.allows(self.auth.as_ref()) {
            // Keep what was typed so the draft resumes intact after sign-in.
            let update = CustomerRequestUpdate::new()
                .current_step(self.sequencer.current_step())
                .answers(self.answers.snapshot())
                .contact(&self.details.contact)
                .message_to_pro(self.details.message_to_pro.trim())
                .availability(self.details.availability.clone());
            if let Persistence::Failed(reason) = self.persist(update).await {
                tracing::debug!(reason = %reason, "Continuing to sign-in without saved state");
            }
            return self
                .finalizer
                .defer(&self.context, self.request.id, &self.policy.sign_in_path)
                .await;
        }

        self.finalize().await
    }

    /// Submission waiting for sign-in for this service and place, if any.
    /// It may belong to another draft than the one this session opened.
    pub async fn pending_submission(&self) -> Result<Option<PendingSubmission>, FlowError> {
        self.finalizer.pending(&self.context).await
    }

    /// Completes a submission deferred to sign-in. Returns `None` when nothing
    /// is pending for this draft or the customer is still signed out. A marker
    /// left by another draft is cleared without writing anything.
    pub async fn resume_pending_submission(&mut self) -> Result<Option<SubmitOutcome>, FlowError> {
        self.ensure_open()?;
        let Some(pending) = self.pending_submission().await? else {
            return Ok(None);
        };
        if pending.request_id != self.request.id {
            tracing::info!(
                pending_request_id = pending.request_id,
                request_id = self.request.id,
                "Dropping pending submission of another draft"
            );
            self.finalizer.clear_pending(&self.context).await;
            return Ok(None);
        }
        if !self.policy.allows(self.auth.as_ref()) {
            tracing::debug!("Pending submission still waits for sign-in");
            return Ok(None);
        }

        self.finalizer.clear_pending(&self.context).await;
        self.finalize().await.map(Some)
    }

    async fn finalize(&mut self) -> Result<SubmitOutcome, FlowError> {
        let state = FinalState {
            answers: self.answers.snapshot(),
            details: &self.details,
            current_step: self.sequencer.current_step(),
            is_last_step: self.sequencer.is_last_step(),
        };
        let outcome = self
            .finalizer
            .finalize(&self.writer, &self.context, self.question_set_id, state)
            .await?;

        match &outcome {
            SubmitOutcome::Submitted(request) => {
                self.request = request.clone();
                self.writer.shutdown();
                self.closed = true;
            }
            SubmitOutcome::SavedAsDraft(request) => {
                self.request = request.clone();
            }
            SubmitOutcome::SignInRequired { .. } => {}
        }
        Ok(outcome)
    }

    /// Closes the flow. An unsubmitted draft is deleted (best effort) unless,
    /// in the guided flow, it is waiting for a sign-in detour; such a draft
    /// gets its pending answers flushed instead.
    pub async fn close(&mut self) -> Result<CloseOutcome, FlowError> {
        let kept = CloseOutcome {
            abandoned: false,
            deleted: false,
        };
        if self.closed {
            return Ok(kept);
        }
        self.closed = true;

        if !self.request.is_draft() {
            self.writer.shutdown();
            return Ok(kept);
        }

        let awaiting_sign_in = match self.pending_submission().await {
            Ok(pending) => pending.is_some_and(|p| p.request_id == self.request.id),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read pending submission marker");
                false
            }
        };
        if self.variant() == FlowVariant::Guided && awaiting_sign_in {
            if let Err(e) = self.writer.flush().await {
                tracing::warn!(request_id = self.request.id, error = %e, "Failed to flush answers on close");
            }
            self.writer.shutdown();
            tracing::info!(request_id = self.request.id, "Keeping draft for sign-in return");
            return Ok(kept);
        }

        self.writer.shutdown();
        if awaiting_sign_in {
            self.finalizer.clear_pending(&self.context).await;
        }
        let deleted = self
            .drafts
            .delete_on_abandon(&self.context, &self.request)
            .await;
        Ok(CloseOutcome {
            abandoned: true,
            deleted,
        })
    }
}
