use mestermind_client::ApiError;

use crate::storage::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Backend request failed: {0}")]
    Api(#[from] ApiError),

    #[error("Session storage failed: {0}")]
    Storage(#[from] StoreError),

    #[error("Step {step} is incomplete")]
    StepIncomplete { step: usize },

    #[error("Already on the final step; submit instead")]
    AtFinalStep,

    #[error("Submitting is only possible on the final step (at {current}, final is {last})")]
    NotOnFinalStep { current: usize, last: usize },

    #[error("Unknown question key: {0}")]
    UnknownQuestion(String),

    #[error("The request flow is closed")]
    Closed,
}
