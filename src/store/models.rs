//! Stored submission records.
//!
//! `internal_*` fields and `watched` are admin annotations and never appear
//! in public responses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Review state of a questionnaire response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    #[default]
    Unreviewed,
    Reviewed,
    Archived,
}

/// Review state of a contact submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    New,
    Reviewed,
    Archived,
}

/// Reviewer assessment. Values are free text ("Low", "Medium", "High").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalScore {
    #[serde(default)]
    pub community_fit: Option<String>,
    #[serde(default)]
    pub lifestyle_alignment: Option<String>,
    #[serde(default)]
    pub decision_maturity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireResponse {
    pub response_id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Truncated digest of the client session id, never the raw value.
    pub session_id: String,
    pub consent: bool,
    pub sections: Map<String, Value>,
    pub free_text: BTreeMap<String, String>,
    pub contact_info: Option<BTreeMap<String, String>>,
    pub wants_contact: bool,
    pub internal_score: InternalScore,
    pub internal_notes: String,
    pub status: ResponseStatus,
    pub watched: bool,
}

impl QuestionnaireResponse {
    /// New unreviewed response. Contact details are dropped unless the
    /// respondent asked to be contacted.
    pub fn new(
        raw_session_id: &str,
        sections: Map<String, Value>,
        free_text: BTreeMap<String, String>,
        contact_info: Option<BTreeMap<String, String>>,
        wants_contact: bool,
    ) -> Self {
        Self {
            response_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            session_id: hash_session_id(raw_session_id),
            consent: true,
            sections,
            free_text,
            contact_info: if wants_contact { contact_info } else { None },
            wants_contact,
            internal_score: InternalScore::default(),
            internal_notes: String::new(),
            status: ResponseStatus::Unreviewed,
            watched: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub submission_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub city: String,
    pub reason: String,
    pub preferred_contact: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub consent: bool,
    pub status: ContactStatus,
    pub internal_notes: String,
    pub watched: bool,
}

/// Fields a visitor fills in on the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub name: String,
    pub city: String,
    pub reason: String,
    pub preferred_contact: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ContactSubmission {
    pub fn new(details: ContactDetails) -> Self {
        Self {
            submission_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            name: details.name,
            city: details.city,
            reason: details.reason,
            preferred_contact: details.preferred_contact,
            email: details.email,
            phone: details.phone,
            consent: true,
            status: ContactStatus::New,
            internal_notes: String::new(),
            watched: false,
        }
    }
}

/// Consented funnel event (homepage_entry, questionnaire_started, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub event_type: String,
    pub event_data: Map<String, Value>,
    pub consent: bool,
}

impl AnalyticsEvent {
    pub fn new(raw_session_id: &str, event_type: String, event_data: Map<String, Value>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            session_id: hash_session_id(raw_session_id),
            event_type,
            event_data,
            consent: true,
        }
    }
}

/// First 16 hex characters of the SHA-256 of a client session id.
pub fn hash_session_id(raw: &str) -> String {
    let mut digest = hex::encode(Sha256::digest(raw.as_bytes()));
    digest.truncate(16);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_is_hashed_and_truncated() {
        let hashed = hash_session_id("abc");
        assert_eq!(hashed, "ba7816bf8f01cfea");
        assert_ne!(hashed, "abc");
    }

    #[test]
    fn test_contact_info_dropped_without_opt_in() {
        let info = BTreeMap::from([("email".to_string(), "a@b.c".to_string())]);
        let kept = QuestionnaireResponse::new("s", Map::new(), BTreeMap::new(), Some(info.clone()), true);
        assert_eq!(kept.contact_info, Some(info.clone()));

        let dropped = QuestionnaireResponse::new("s", Map::new(), BTreeMap::new(), Some(info), false);
        assert_eq!(dropped.contact_info, None);
        assert_eq!(dropped.status, ResponseStatus::Unreviewed);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ResponseStatus::Unreviewed).unwrap(), "\"unreviewed\"");
        assert_eq!(serde_json::to_string(&ContactStatus::New).unwrap(), "\"new\"");
        let parsed: ContactStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(parsed, ContactStatus::Archived);
    }
}
