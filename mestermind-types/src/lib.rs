//! Types shared between the Mestermind quote-request engine, its REST client
//! and the web front end (exported to TypeScript by `generate_api_types`).

pub mod answers;
pub mod customer_request;
pub mod details;
pub mod question_set;
pub mod typescript_gen;

pub use answers::{AnswerValue, Answers, FileHandle};
pub use customer_request::{
    CustomerRequest, CustomerRequestUpdate, NewCustomerRequest, RequestStatus,
};
pub use details::{minutes_since_midnight, Availability, ContactDetails, RequestDetails, Weekday};
pub use question_set::{
    Question, QuestionSet, QuestionSetStatus, QuestionSetSummary, QuestionType,
};
pub use typescript_gen::{generate_typescript_definitions, API_TYPES};
