//! Command implementations for the mestermind CLI

pub mod abandon;
pub mod config;
pub mod prompts;
pub mod question_set;
pub mod request;
pub mod status;

use mestermind_client::{HttpMarketplaceClient, MarketplaceApi};
use mestermind_forms::{
    DraftPersistence, FileSessionStore, RequestContext, SessionDeps, SessionStore, StaticAuth,
    SubmissionFinalizer,
};
use std::sync::Arc;

use crate::config::MestermindConfig;
use crate::error::CliError;

/// Backend client and session store built from the effective configuration
pub struct AppContext {
    pub config: MestermindConfig,
    pub api: Arc<dyn MarketplaceApi>,
    pub store: Arc<dyn SessionStore>,
}

impl AppContext {
    pub fn from_config(config: MestermindConfig) -> Result<Self, CliError> {
        let api = HttpMarketplaceClient::with_timeout(config.api.base_url.clone(), config.timeout())?
            .with_token(config.api.token.clone());
        let store = FileSessionStore::new(config.storage.path.clone());
        tracing::debug!(
            base_url = %config.api.base_url,
            store = %config.storage.path.display(),
            "Application context ready"
        );

        Ok(Self {
            api: Arc::new(api),
            store: Arc::new(store),
            config,
        })
    }

    /// A bearer token stands in for a signed-in customer
    pub fn auth(&self) -> StaticAuth {
        match &self.config.api.token {
            Some(token) if !token.trim().is_empty() => StaticAuth::signed_in("token", None),
            _ => StaticAuth::anonymous(),
        }
    }

    pub fn session_deps(&self) -> SessionDeps {
        SessionDeps {
            api: self.api.clone(),
            store: self.store.clone(),
            auth: Arc::new(self.auth()),
            settings: self.config.flow_settings(),
        }
    }

    pub fn drafts(&self) -> DraftPersistence {
        DraftPersistence::new(
            self.api.clone(),
            self.store.clone(),
            self.config.flow_settings().keys,
        )
    }

    pub fn finalizer(&self) -> SubmissionFinalizer {
        SubmissionFinalizer::new(self.store.clone(), self.config.flow_settings().keys)
    }
}

/// Context for a service page, returning to that page after sign-in
pub fn request_context(service_id: i64, place_id: Option<i64>) -> RequestContext {
    let return_to = match place_id {
        Some(place) => format!("/services/{service_id}?place={place}"),
        None => format!("/services/{service_id}"),
    };
    RequestContext::new(service_id)
        .with_place(place_id)
        .with_return_to(return_to)
}
