//! Contains the data models for API requests and responses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::store::{
    ContactDetails, ContactStatus, ContactUpdate, DEFAULT_PAGE_LIMIT, ListFilter,
    QuestionnaireUpdate, ResponseStatus,
};

fn default_true() -> bool {
    true
}

/// Represents a questionnaire submission from the public site.
#[derive(Debug, Deserialize)]
pub struct QuestionnaireSubmission {
    pub session_id: String,
    #[serde(default = "default_true")]
    pub consent: bool,
    #[serde(default)]
    pub sections: Map<String, Value>,
    #[serde(default)]
    pub free_text: BTreeMap<String, String>,
    #[serde(default)]
    pub contact_info: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub wants_contact: bool,
}

/// Public confirmation; never includes review data.
#[derive(Debug, Serialize)]
pub struct QuestionnaireReceipt {
    pub response_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub status: &'static str,
}

/// Represents a contact form submission.
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    #[serde(default)]
    pub city: String,
    pub reason: String,
    #[serde(default)]
    pub preferred_contact: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_true")]
    pub consent: bool,
}

impl ContactRequest {
    pub fn into_details(self) -> ContactDetails {
        ContactDetails {
            name: self.name,
            city: self.city,
            reason: self.reason,
            preferred_contact: self.preferred_contact,
            email: self.email,
            phone: self.phone,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactReceipt {
    pub submission_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsEventRequest {
    pub event_type: String,
    pub session_id: String,
    #[serde(default)]
    pub event_data: Map<String, Value>,
    #[serde(default = "default_true")]
    pub consent: bool,
}

/// Query string for the admin listings.
#[derive(Debug, Deserialize)]
pub struct ListQuery<S> {
    pub status: Option<S>,
    pub watched: Option<bool>,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

impl<S> ListQuery<S> {
    pub fn into_filter(self) -> ListFilter<S> {
        ListFilter {
            status: self.status,
            watched: self.watched,
            skip: self.skip.unwrap_or(0),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        }
    }
}

/// Query string for `PATCH /api/admin/questionnaire/{id}`. The reviewer
/// score, if any, comes in the JSON body.
#[derive(Debug, Deserialize)]
pub struct QuestionnairePatch {
    pub status: Option<ResponseStatus>,
    pub internal_notes: Option<String>,
    pub watched: Option<bool>,
}

impl QuestionnairePatch {
    pub fn into_update(self) -> QuestionnaireUpdate {
        QuestionnaireUpdate {
            status: self.status,
            internal_notes: self.internal_notes,
            internal_score: None,
            watched: self.watched,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactPatch {
    pub status: Option<ContactStatus>,
    pub internal_notes: Option<String>,
    pub watched: Option<bool>,
}

impl ContactPatch {
    pub fn into_update(self) -> ContactUpdate {
        ContactUpdate {
            status: self.status,
            internal_notes: self.internal_notes,
            watched: self.watched,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthVerifyResponse {
    pub status: &'static str,
    pub username: String,
}
