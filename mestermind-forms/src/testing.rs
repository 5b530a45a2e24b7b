//! In-process stand-in for the marketplace backend used by the engine tests.

use async_trait::async_trait;
use mestermind_client::{ApiError, MarketplaceApi};
use mestermind_types::{
    CustomerRequest, CustomerRequestUpdate, NewCustomerRequest, QuestionSet, QuestionSetSummary,
    RequestStatus,
};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    ListQuestionSets(i64),
    GetQuestionSet(i64),
    Create(NewCustomerRequest),
    GetRequest(i64),
    Update(i64, CustomerRequestUpdate),
    Delete(i64),
}

#[derive(Default)]
struct FakeState {
    question_sets: Vec<QuestionSet>,
    requests: BTreeMap<i64, CustomerRequest>,
    next_id: i64,
    calls: Vec<ApiCall>,
    completed_updates: Vec<CustomerRequestUpdate>,
    fail_updates: bool,
    fail_deletes: bool,
    fail_lists: bool,
    update_latency: Duration,
}

pub struct FakeMarketplace {
    state: Mutex<FakeState>,
}

impl FakeMarketplace {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_id: 100,
                ..FakeState::default()
            }),
        }
    }

    pub fn add_question_set(&self, set: QuestionSet) {
        self.state.lock().unwrap().question_sets.push(set);
    }

    /// Stores a draft directly, as if created in an earlier visit
    pub fn seed_draft(
        &self,
        service_id: i64,
        question_set_id: Option<i64>,
        place_id: Option<i64>,
    ) -> CustomerRequest {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let request = blank_request(state.next_id, service_id, question_set_id, place_id);
        state.requests.insert(request.id, request.clone());
        request
    }

    pub fn request(&self, id: i64) -> Option<CustomerRequest> {
        self.state.lock().unwrap().requests.get(&id).cloned()
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn updates(&self) -> Vec<(i64, CustomerRequestUpdate)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::Update(id, update) => Some((id, update)),
                _ => None,
            })
            .collect()
    }

    /// Successful updates in the order the backend applied them
    pub fn completed_updates(&self) -> Vec<CustomerRequestUpdate> {
        self.state.lock().unwrap().completed_updates.clone()
    }

    pub fn creates(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ApiCall::Create(_)))
            .count()
    }

    pub fn deletes(&self) -> Vec<i64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn fail_updates(&self, fail: bool) {
        self.state.lock().unwrap().fail_updates = fail;
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.state.lock().unwrap().fail_deletes = fail;
    }

    pub fn fail_lists(&self, fail: bool) {
        self.state.lock().unwrap().fail_lists = fail;
    }

    pub fn set_update_latency(&self, latency: Duration) {
        self.state.lock().unwrap().update_latency = latency;
    }

    fn record(&self, call: ApiCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

fn blank_request(
    id: i64,
    service_id: i64,
    question_set_id: Option<i64>,
    place_id: Option<i64>,
) -> CustomerRequest {
    CustomerRequest {
        id,
        service_id,
        question_set_id,
        place_id,
        mester_id: None,
        current_step: 0,
        answers: Default::default(),
        first_name: None,
        last_name: None,
        email: None,
        phone: None,
        postal_code: None,
        message_to_pro: None,
        availability: None,
        status: RequestStatus::Draft,
        created_at: None,
        updated_at: None,
    }
}

#[async_trait]
impl MarketplaceApi for FakeMarketplace {
    async fn list_question_sets(
        &self,
        service_id: i64,
    ) -> Result<Vec<QuestionSetSummary>, ApiError> {
        self.record(ApiCall::ListQuestionSets(service_id));
        let state = self.state.lock().unwrap();
        if state.fail_lists {
            return Err(ApiError::api_error(500, "list failed".to_string()));
        }
        Ok(state
            .question_sets
            .iter()
            .filter(|s| s.service_id == service_id)
            .map(|s| QuestionSetSummary {
                id: s.id,
                service_id: s.service_id,
                name: s.name.clone(),
                status: s.status,
                is_active: s.is_active,
                version: s.version,
            })
            .collect())
    }

    async fn get_question_set(&self, id: i64) -> Result<QuestionSet, ApiError> {
        self.record(ApiCall::GetQuestionSet(id));
        self.state
            .lock()
            .unwrap()
            .question_sets
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("question set {id}")))
    }

    async fn create_customer_request(
        &self,
        request: &NewCustomerRequest,
    ) -> Result<CustomerRequest, ApiError> {
        self.record(ApiCall::Create(request.clone()));
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let mut created = blank_request(
            state.next_id,
            request.service_id,
            request.question_set_id,
            request.place_id,
        );
        created.mester_id = request.mester_id;
        created.answers = request.answers.clone();
        created.current_step = request.current_step;
        created.status = request.status;
        state.requests.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_customer_request(&self, id: i64) -> Result<CustomerRequest, ApiError> {
        self.record(ApiCall::GetRequest(id));
        self.request(id)
            .ok_or_else(|| ApiError::not_found(format!("customer request {id}")))
    }

    async fn update_customer_request(
        &self,
        id: i64,
        update: &CustomerRequestUpdate,
    ) -> Result<CustomerRequest, ApiError> {
        self.record(ApiCall::Update(id, update.clone()));
        let latency = self.state.lock().unwrap().update_latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.lock().unwrap();
        if state.fail_updates {
            return Err(ApiError::api_error(503, "update failed".to_string()));
        }
        let Some(request) = state.requests.get_mut(&id) else {
            return Err(ApiError::not_found(format!("customer request {id}")));
        };
        update.apply_to(request);
        let updated = request.clone();
        state.completed_updates.push(update.clone());
        Ok(updated)
    }

    async fn delete_customer_request(&self, id: i64) -> Result<(), ApiError> {
        self.record(ApiCall::Delete(id));
        let mut state = self.state.lock().unwrap();
        if state.fail_deletes {
            return Err(ApiError::api_error(500, "delete failed".to_string()));
        }
        state
            .requests
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found(format!("customer request {id}")))
    }
}
