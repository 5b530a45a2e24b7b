use async_trait::async_trait;
use mestermind_types::{
    CustomerRequest, CustomerRequestUpdate, NewCustomerRequest, QuestionSet, QuestionSetSummary,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::{client::MarketplaceApi, error::ApiError};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// `reqwest` implementation of [`MarketplaceApi`]
pub struct HttpMarketplaceClient {
    base_url: String,
    token: Option<String>,
    http_client: reqwest::Client,
}

impl HttpMarketplaceClient {
    /// Create a client for the API rooted at `base_url`, e.g. `https://api.mestermind.hu/api/v1`
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(ApiError::invalid_request("Base URL cannot be empty"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network { source: e })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            http_client,
        })
    }

    /// Bearer token issued by the identity provider for the signed-in user
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::invalid_request(format!("Invalid token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        tracing::debug!(method = %method, url = %url, "Sending backend request");

        Ok(self.http_client.request(method, url).headers(headers))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network { source: e })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if std::env::var("MESTERMIND_LOG_PAYLOADS").is_ok() {
            tracing::debug!(status = status.as_u16(), body = %body, "Backend response");
        }

        if status.is_success() {
            Ok(body)
        } else {
            tracing::warn!(status = status.as_u16(), "Backend request failed");
            Err(ApiError::from_status(status, body))
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(builder).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MarketplaceApi for HttpMarketplaceClient {
    async fn list_question_sets(
        &self,
        service_id: i64,
    ) -> Result<Vec<QuestionSetSummary>, ApiError> {
        let builder = self
            .request(Method::GET, "/question-sets")?
            .query(&[("service_id", service_id)]);
        self.send_json(builder).await
    }

    async fn get_question_set(&self, id: i64) -> Result<QuestionSet, ApiError> {
        let builder = self.request(Method::GET, &format!("/question-sets/{id}"))?;
        self.send_json(builder).await
    }

    async fn create_customer_request(
        &self,
        request: &NewCustomerRequest,
    ) -> Result<CustomerRequest, ApiError> {
        let builder = self
            .request(Method::POST, "/customer-requests")?
            .json(request);
        self.send_json(builder).await
    }

    async fn get_customer_request(&self, id: i64) -> Result<CustomerRequest, ApiError> {
        let builder = self.request(Method::GET, &format!("/customer-requests/{id}"))?;
        self.send_json(builder).await
    }

    async fn update_customer_request(
        &self,
        id: i64,
        update: &CustomerRequestUpdate,
    ) -> Result<CustomerRequest, ApiError> {
        let builder = self
            .request(Method::PATCH, &format!("/customer-requests/{id}"))?
            .json(update);
        self.send_json(builder).await
    }

    async fn delete_customer_request(&self, id: i64) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, &format!("/customer-requests/{id}"))?;
        self.send(builder).await.map(|_| ())
    }
}
