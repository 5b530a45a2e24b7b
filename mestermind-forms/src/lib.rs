//! Engine behind the Mestermind quote-request form.
//!
//! A [`QuoteRequestSession`] walks a customer through the published question
//! set of a service, keeps a server-side draft in sync while they type and
//! finally opens the request for professionals.

pub mod answers;
pub mod auth;
pub mod autosave;
pub mod drafts;
pub mod error;
pub mod finalizer;
pub mod question_model;
pub mod session;
pub mod steps;
pub mod storage;

#[cfg(test)]
mod testing;

pub use answers::AnswerStore;
pub use auth::{AuthProvider, AuthenticatedUser, StaticAuth, SubmitPolicy};
pub use autosave::{Autosaver, DEFAULT_AUTOSAVE_DELAY};
pub use drafts::{DraftPersistence, QuestionSetResolution, RequestContext};
pub use error::FlowError;
pub use finalizer::{FinalState, PendingSubmission, SubmissionFinalizer, SubmitOutcome};
pub use question_model::{
    adapt_question_list, adapt_questions, constraint_hints, timeline_question, ConstraintHint,
    TIMELINE_KEY,
};
pub use session::{
    CloseOutcome, FlowSettings, Persistence, QuoteRequestSession, SessionDeps, StepChange,
};
pub use steps::{ExtraStep, FlowVariant, StepSequencer, StepView};
pub use storage::{
    FileSessionStore, InMemorySessionStore, KeySpace, SessionStore, StoreError, StoreKey,
};
