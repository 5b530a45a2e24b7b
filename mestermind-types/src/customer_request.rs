use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::answers::Answers;
use crate::details::{Availability, ContactDetails};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Draft,
    Open,
    Submitted,
}

/// Server-side quote request, in progress (`draft`) or sent to professionals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct CustomerRequest {
    pub id: i64,
    pub service_id: i64,
    #[serde(default)]
    pub question_set_id: Option<i64>,
    #[serde(default)]
    pub place_id: Option<i64>,
    #[serde(default)]
    pub mester_id: Option<i64>,
    #[serde(default)]
    pub current_step: usize,
    #[serde(default)]
    pub answers: Answers,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub message_to_pro: Option<String>,
    #[serde(default)]
    pub availability: Option<Availability>,
    pub status: RequestStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CustomerRequest {
    pub fn is_draft(&self) -> bool {
        self.status == RequestStatus::Draft
    }

    /// Contact fields gathered into one value, missing ones empty
    pub fn contact(&self) -> ContactDetails {
        ContactDetails {
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            phone: self.phone.clone().unwrap_or_default(),
            postal_code: self.postal_code.clone().unwrap_or_default(),
        }
    }
}

/// Body of `POST /customer-requests`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct NewCustomerRequest {
    pub service_id: i64,
    pub question_set_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub place_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub mester_id: Option<i64>,
    pub answers: Answers,
    pub current_step: usize,
    pub status: RequestStatus,
}

impl NewCustomerRequest {
    /// Fresh draft at step 0 with no answers
    pub fn draft(service_id: i64, question_set_id: Option<i64>) -> Self {
        Self {
            service_id,
            question_set_id,
            place_id: None,
            mester_id: None,
            answers: Answers::new(),
            current_step: 0,
            status: RequestStatus::Draft,
        }
    }

    pub fn place(mut self, place_id: Option<i64>) -> Self {
        self.place_id = place_id;
        self
    }

    pub fn mester(mut self, mester_id: Option<i64>) -> Self {
        self.mester_id = mester_id;
        self
    }
}

/// Body of `PATCH /customer-requests/{id}`; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
pub struct CustomerRequestUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub answers: Option<Answers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub current_step: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub message_to_pro: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub availability: Option<Availability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub status: Option<RequestStatus>,
}

impl CustomerRequestUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answers(mut self, answers: Answers) -> Self {
        self.answers = Some(answers);
        self
    }

    pub fn current_step(mut self, step: usize) -> Self {
        self.current_step = Some(step);
        self
    }

    /// Denormalized contact fields, all five are sent
    pub fn contact(mut self, contact: &ContactDetails) -> Self {
        self.first_name = Some(contact.first_name.trim().to_string());
        self.last_name = Some(contact.last_name.trim().to_string());
        self.email = Some(contact.email.trim().to_string());
        self.phone = Some(contact.phone.trim().to_string());
        self.postal_code = Some(contact.postal_code.trim().to_string());
        self
    }

    pub fn message_to_pro(mut self, message: impl Into<String>) -> Self {
        self.message_to_pro = Some(message.into());
        self
    }

    pub fn availability(mut self, availability: Option<Availability>) -> Self {
        self.availability = availability;
        self
    }

    pub fn status(mut self, status: RequestStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the update to a local copy, mirroring the server's PATCH semantics
    pub fn apply_to(&self, request: &mut CustomerRequest) {
        if let Some(answers) = &self.answers {
            request.answers = answers.clone();
        }
        if let Some(step) = self.current_step {
            request.current_step = step;
        }
        if let Some(v) = &self.first_name {
            request.first_name = Some(v.clone());
        }
        if let Some(v) = &self.last_name {
            request.last_name = Some(v.clone());
        }
        if let Some(v) = &self.email {
            request.email = Some(v.clone());
        }
        if let Some(v) = &self.phone {
            request.phone = Some(v.clone());
        }
        if let Some(v) = &self.postal_code {
            request.postal_code = Some(v.clone());
        }
        if let Some(v) = &self.message_to_pro {
            request.message_to_pro = Some(v.clone());
        }
        if let Some(v) = &self.availability {
            request.availability = Some(v.clone());
        }
        if let Some(status) = self.status {
            request.status = status;
        }
    }
}
