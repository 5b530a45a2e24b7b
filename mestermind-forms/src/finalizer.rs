use mestermind_types::{Answers, CustomerRequest, CustomerRequestUpdate, RequestDetails, RequestStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::autosave::Autosaver;
use crate::drafts::RequestContext;
use crate::error::FlowError;
use crate::storage::{KeySpace, SessionStore, StoreError, StoreKey};

const SUBMITTED_FLAG: &str = "true";

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Request is open for professionals; the flow is over
    Submitted(CustomerRequest),
    /// Final state saved but left as a draft, the preconditions to publish were not met
    SavedAsDraft(CustomerRequest),
    /// Nothing was submitted; send the customer to sign in first
    SignInRequired {
        sign_in_path: String,
        return_to: String,
    },
}

/// Stored while a submission waits for sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSubmission {
    /// The draft that was about to be submitted
    pub request_id: i64,
    pub return_to: String,
}

/// Everything the final write needs from the flow
#[derive(Debug, Clone)]
pub struct FinalState<'a> {
    pub answers: Answers,
    pub details: &'a RequestDetails,
    pub current_step: usize,
    pub is_last_step: bool,
}

impl FinalState<'_> {
    /// Publishing requires reaching the end and a way to contact the customer
    pub fn can_publish(&self) -> bool {
        self.is_last_step && self.details.contact.is_reachable()
    }
}

pub struct SubmissionFinalizer {
    store: Arc<dyn SessionStore>,
    keys: KeySpace,
}

impl SubmissionFinalizer {
    pub fn new(store: Arc<dyn SessionStore>, keys: KeySpace) -> Self {
        Self { store, keys }
    }

    /// Persists the final state and, when allowed, opens the request and
    /// raises the submitted flag for the hosting page.
    pub async fn finalize(
        &self,
        writer: &Autosaver,
        context: &RequestContext,
        question_set_id: Option<i64>,
        state: FinalState<'_>,
    ) -> Result<SubmitOutcome, FlowError> {
        let publish = state.can_publish();
        let status = if publish {
            RequestStatus::Open
        } else {
            RequestStatus::Draft
        };

        let update = CustomerRequestUpdate::new()
            .answers(state.answers)
            .current_step(state.current_step)
            .contact(&state.details.contact)
            .message_to_pro(state.details.message_to_pro.trim())
            .availability(state.details.availability.clone())
            .status(status);
        let request = writer.write_through(update).await?;

        if !publish {
            tracing::info!(
                request_id = request.id,
                step = state.current_step,
                "Final state saved as draft"
            );
            return Ok(SubmitOutcome::SavedAsDraft(request));
        }

        // The request is already open; bookkeeping failures are only logged.
        self.set_or_warn(&context.submitted_key(), SUBMITTED_FLAG).await;
        self.remove_or_warn(&context.draft_key(question_set_id)).await;
        self.remove_or_warn(&context.pending_submission_key()).await;

        tracing::info!(
            request_id = request.id,
            service_id = context.service_id,
            "Quote request submitted"
        );
        Ok(SubmitOutcome::Submitted(request))
    }

    /// Remembers that submission of `request_id` waits for sign-in
    pub async fn defer(
        &self,
        context: &RequestContext,
        request_id: i64,
        sign_in_path: &str,
    ) -> Result<SubmitOutcome, FlowError> {
        let key = self.keys.render(&context.pending_submission_key());
        let marker = PendingSubmission {
            request_id,
            return_to: context.return_to.clone(),
        };
        let raw = serde_json::to_string(&marker).map_err(StoreError::from)?;
        self.store.set(&key, &raw).await?;

        tracing::info!(
            request_id,
            service_id = context.service_id,
            return_to = %context.return_to,
            "Submission deferred until sign-in"
        );
        Ok(SubmitOutcome::SignInRequired {
            sign_in_path: sign_in_path.to_string(),
            return_to: context.return_to.clone(),
        })
    }

    /// The submission waiting for sign-in, if any. An unreadable marker is
    /// dropped.
    pub async fn pending(
        &self,
        context: &RequestContext,
    ) -> Result<Option<PendingSubmission>, FlowError> {
        let key = self.keys.render(&context.pending_submission_key());
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<PendingSubmission>(&raw) {
            Ok(marker) => Ok(Some(marker)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding unreadable pending submission");
                self.store.remove(&key).await?;
                Ok(None)
            }
        }
    }

    /// Return destination of a deferred submission, if one is waiting
    pub async fn pending_return_to(
        &self,
        context: &RequestContext,
    ) -> Result<Option<String>, FlowError> {
        Ok(self.pending(context).await?.map(|p| p.return_to))
    }

    pub async fn clear_pending(&self, context: &RequestContext) {
        self.remove_or_warn(&context.pending_submission_key()).await;
    }

    /// Whether a request was submitted for this service and place
    pub async fn is_submitted(&self, context: &RequestContext) -> Result<bool, FlowError> {
        let key = self.keys.render(&context.submitted_key());
        Ok(self.store.get(&key).await?.as_deref() == Some(SUBMITTED_FLAG))
    }

    /// Lowers the submitted flag once the host page has reacted to it
    pub async fn acknowledge_submitted(&self, context: &RequestContext) -> Result<(), FlowError> {
        let key = self.keys.render(&context.submitted_key());
        Ok(self.store.remove(&key).await?)
    }

    async fn set_or_warn(&self, key: &StoreKey, value: &str) {
        let key = self.keys.render(key);
        if let Err(e) = self.store.set(&key, value).await {
            tracing::warn!(key = %key, error = %e, "Failed to write session flag");
        }
    }

    async fn remove_or_warn(&self, key: &StoreKey) {
        let key = self.keys.render(key);
        if let Err(e) = self.store.remove(&key).await {
            tracing::warn!(key = %key, error = %e, "Failed to clear session entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autosave::DEFAULT_AUTOSAVE_DELAY;
    use crate::storage::InMemorySessionStore;
    use crate::testing::FakeMarketplace;
    use mestermind_types::{AnswerValue, ContactDetails};

    fn finalizer() -> (SubmissionFinalizer, InMemorySessionStore) {
        let store = InMemorySessionStore::new();
        (
            SubmissionFinalizer::new(Arc::new(store.clone()), KeySpace::default()),
            store,
        )
    }

    fn details(email: &str) -> RequestDetails {
        RequestDetails {
            contact: ContactDetails {
                first_name: " Anna ".to_string(),
                email: email.to_string(),
                ..ContactDetails::default()
            },
            message_to_pro: "Please call after 5pm ".to_string(),
            ..RequestDetails::default()
        }
    }

    fn answers() -> Answers {
        let mut answers = Answers::new();
        answers.insert("q1".to_string(), AnswerValue::text("tiles"));
        answers
    }

    #[tokio::test]
    async fn test_publishes_and_raises_flag() {
        let api = Arc::new(FakeMarketplace::new());
        let draft = api.seed_draft(4, Some(9), Some(12));
        let writer = Autosaver::new(api.clone(), draft.id, DEFAULT_AUTOSAVE_DELAY);
        let (finalizer, store) = finalizer();
        let context = RequestContext::new(4).with_place(Some(12));
        let keys = KeySpace::default();
        store
            .set(&keys.render(&context.draft_key(Some(9))), &draft.id.to_string())
            .await
            .unwrap();

        let details = details("anna@example.com");
        let outcome = finalizer
            .finalize(
                &writer,
                &context,
                Some(9),
                FinalState {
                    answers: answers(),
                    details: &details,
                    current_step: 4,
                    is_last_step: true,
                },
            )
            .await
            .unwrap();

        let SubmitOutcome::Submitted(request) = outcome else {
            panic!("Expected submission, got {outcome:?}");
        };
        assert_eq!(request.status, RequestStatus::Open);
        assert_eq!(request.first_name.as_deref(), Some("Anna"));
        assert_eq!(request.message_to_pro.as_deref(), Some("Please call after 5pm"));
        assert_eq!(request.answers, answers());
        assert!(finalizer.is_submitted(&context).await.unwrap());
        assert_eq!(store.keys(), vec!["mestermind:v1:submitted:4:12".to_string()]);

        finalizer.acknowledge_submitted(&context).await.unwrap();
        assert!(!finalizer.is_submitted(&context).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_contact_keeps_draft() {
        let api = Arc::new(FakeMarketplace::new());
        let draft = api.seed_draft(4, Some(9), None);
        let writer = Autosaver::new(api.clone(), draft.id, DEFAULT_AUTOSAVE_DELAY);
        let (finalizer, _) = finalizer();
        let context = RequestContext::new(4);

        let details = details(" ");
        let outcome = finalizer
            .finalize(
                &writer,
                &context,
                Some(9),
                FinalState {
                    answers: answers(),
                    details: &details,
                    current_step: 4,
                    is_last_step: true,
                },
            )
            .await
            .unwrap();

        assert!(matches!(outcome, SubmitOutcome::SavedAsDraft(ref r) if r.is_draft()));
        assert!(!finalizer.is_submitted(&context).await.unwrap());
        assert_eq!(api.updates()[0].1.status, Some(RequestStatus::Draft));
    }

    #[test]
    fn test_not_last_step_keeps_draft() {
        let state_details = details("anna@example.com");
        let state = FinalState {
            answers: Answers::new(),
            details: &state_details,
            current_step: 2,
            is_last_step: false,
        };
        assert!(!state.can_publish());
    }

    #[tokio::test]
    async fn test_defer_records_draft_and_return_destination() {
        let (finalizer, _) = finalizer();
        let context = RequestContext::new(4).with_return_to("/services/4?place=12");

        let outcome = finalizer.defer(&context, 101, "/register").await.unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::SignInRequired {
                sign_in_path: "/register".to_string(),
                return_to: "/services/4?place=12".to_string(),
            }
        );
        assert_eq!(
            finalizer.pending(&context).await.unwrap(),
            Some(PendingSubmission {
                request_id: 101,
                return_to: "/services/4?place=12".to_string(),
            })
        );
        assert_eq!(
            finalizer.pending_return_to(&context).await.unwrap().as_deref(),
            Some("/services/4?place=12")
        );

        finalizer.clear_pending(&context).await;
        assert_eq!(finalizer.pending_return_to(&context).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreadable_pending_marker_is_dropped() {
        let (finalizer, store) = finalizer();
        let context = RequestContext::new(4);
        let key = KeySpace::default().render(&context.pending_submission_key());
        store.set(&key, "/services/4").await.unwrap();

        assert_eq!(finalizer.pending(&context).await.unwrap(), None);
        assert!(store.keys().is_empty());
    }
}
