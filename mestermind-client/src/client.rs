use async_trait::async_trait;
use mestermind_types::{
    CustomerRequest, CustomerRequestUpdate, NewCustomerRequest, QuestionSet, QuestionSetSummary,
};

use crate::error::ApiError;

/// Backend operations the quote-request engine depends on
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// `GET /question-sets?service_id=..`
    async fn list_question_sets(&self, service_id: i64)
        -> Result<Vec<QuestionSetSummary>, ApiError>;

    /// `GET /question-sets/{id}`
    async fn get_question_set(&self, id: i64) -> Result<QuestionSet, ApiError>;

    /// `POST /customer-requests`
    async fn create_customer_request(
        &self,
        request: &NewCustomerRequest,
    ) -> Result<CustomerRequest, ApiError>;

    /// `GET /customer-requests/{id}`
    async fn get_customer_request(&self, id: i64) -> Result<CustomerRequest, ApiError>;

    /// `PATCH /customer-requests/{id}`
    async fn update_customer_request(
        &self,
        id: i64,
        update: &CustomerRequestUpdate,
    ) -> Result<CustomerRequest, ApiError>;

    /// `DELETE /customer-requests/{id}`
    async fn delete_customer_request(&self, id: i64) -> Result<(), ApiError>;
}
