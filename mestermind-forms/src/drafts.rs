use mestermind_client::MarketplaceApi;
use mestermind_types::{CustomerRequest, NewCustomerRequest, QuestionSet};
use std::sync::Arc;

use crate::error::FlowError;
use crate::storage::{KeySpace, SessionStore, StoreKey};

/// Where a quote request is being made from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub service_id: i64,
    pub place_id: Option<i64>,
    /// Set when the request goes to one professional directly
    pub mester_id: Option<i64>,
    /// Page to come back to after a sign-in detour
    pub return_to: String,
}

impl RequestContext {
    pub fn new(service_id: i64) -> Self {
        Self {
            service_id,
            place_id: None,
            mester_id: None,
            return_to: "/".to_string(),
        }
    }

    pub fn with_place(mut self, place_id: Option<i64>) -> Self {
        self.place_id = place_id;
        self
    }

    pub fn with_mester(mut self, mester_id: Option<i64>) -> Self {
        self.mester_id = mester_id;
        self
    }

    pub fn with_return_to(mut self, return_to: impl Into<String>) -> Self {
        self.return_to = return_to.into();
        self
    }

    pub fn draft_key(&self, question_set_id: Option<i64>) -> StoreKey {
        StoreKey::draft(self.service_id, question_set_id, self.place_id)
    }

    pub fn submitted_key(&self) -> StoreKey {
        StoreKey::submitted(self.service_id, self.place_id)
    }

    pub fn pending_submission_key(&self) -> StoreKey {
        StoreKey::pending_submission(self.service_id, self.place_id)
    }
}

#[derive(Debug, Clone)]
pub enum QuestionSetResolution {
    Published(QuestionSet),
    /// The service has no usable question set; the flow skips to its extra steps
    NonePublished,
}

/// Creates, resumes and abandons the server-side draft of a quote request
#[derive(Clone)]
pub struct DraftPersistence {
    api: Arc<dyn MarketplaceApi>,
    store: Arc<dyn SessionStore>,
    keys: KeySpace,
}

impl DraftPersistence {
    pub fn new(api: Arc<dyn MarketplaceApi>, store: Arc<dyn SessionStore>, keys: KeySpace) -> Self {
        Self { api, store, keys }
    }

    pub fn api(&self) -> &Arc<dyn MarketplaceApi> {
        &self.api
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    /// Highest-versioned published, active question set of the service
    pub async fn resolve_question_set(
        &self,
        service_id: i64,
    ) -> Result<QuestionSetResolution, FlowError> {
        let summaries = self.api.list_question_sets(service_id).await?;

        let Some(latest) = summaries
            .iter()
            .filter(|s| s.is_eligible())
            .max_by_key(|s| s.version)
        else {
            tracing::info!(service_id, "No published question set for service");
            return Ok(QuestionSetResolution::NonePublished);
        };

        let set = self.api.get_question_set(latest.id).await?;
        tracing::debug!(
            service_id,
            question_set_id = set.id,
            version = set.version,
            questions = set.questions.len(),
            "Resolved question set"
        );
        Ok(QuestionSetResolution::Published(set))
    }

    /// Draft id remembered for this context and question set, if any
    pub async fn stored_draft_id(
        &self,
        context: &RequestContext,
        question_set_id: Option<i64>,
    ) -> Result<Option<i64>, FlowError> {
        let key = self.keys.render(&context.draft_key(question_set_id));
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };
        match raw.trim().parse::<i64>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                tracing::warn!(key = %key, value = %raw, "Discarding unreadable draft pointer");
                self.store.remove(&key).await?;
                Ok(None)
            }
        }
    }

    /// Resumes the remembered draft when it still belongs to `question_set_id`,
    /// otherwise starts a new one and remembers it.
    pub async fn resume_or_create(
        &self,
        context: &RequestContext,
        question_set_id: Option<i64>,
    ) -> Result<CustomerRequest, FlowError> {
        let key = self.keys.render(&context.draft_key(question_set_id));

        if let Some(draft_id) = self.stored_draft_id(context, question_set_id).await? {
            match self.api.get_customer_request(draft_id).await {
                Ok(draft) if draft.question_set_id == question_set_id && draft.is_draft() => {
                    tracing::info!(request_id = draft.id, step = draft.current_step, "Resuming draft");
                    return Ok(draft);
                }
                Ok(draft) => {
                    tracing::debug!(
                        request_id = draft.id,
                        stored_set = ?draft.question_set_id,
                        current_set = ?question_set_id,
                        status = ?draft.status,
                        "Stored draft no longer matches, starting over"
                    );
                }
                Err(e) => {
                    tracing::debug!(request_id = draft_id, error = %e, "Stored draft unavailable, starting over");
                }
            }
        }

        let body = NewCustomerRequest::draft(context.service_id, question_set_id)
            .place(context.place_id)
            .mester(context.mester_id);
        let draft = self.api.create_customer_request(&body).await?;
        self.store.set(&key, &draft.id.to_string()).await?;

        tracing::info!(
            request_id = draft.id,
            service_id = context.service_id,
            "Created draft request"
        );
        Ok(draft)
    }

    /// Best-effort delete of an abandoned draft. The pointer is always cleared;
    /// returns whether the backend confirmed the delete.
    pub async fn delete_on_abandon(
        &self,
        context: &RequestContext,
        draft: &CustomerRequest,
    ) -> bool {
        let deleted = match self.api.delete_customer_request(draft.id).await {
            Ok(()) => {
                tracing::info!(request_id = draft.id, "Deleted abandoned draft");
                true
            }
            Err(e) => {
                tracing::warn!(request_id = draft.id, error = %e, "Failed to delete abandoned draft");
                false
            }
        };

        self.forget(context, draft.question_set_id).await;
        deleted
    }

    /// Removes the draft pointer, logging instead of failing
    pub async fn forget(&self, context: &RequestContext, question_set_id: Option<i64>) {
        let key = self.keys.render(&context.draft_key(question_set_id));
        if let Err(e) = self.store.remove(&key).await {
            tracing::warn!(key = %key, error = %e, "Failed to clear draft pointer");
        }
    }
}
