//! Submission storage behind an async trait so the in-memory store can be
//! replaced by a database-backed one.

pub mod memory;
pub mod models;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use memory::InMemorySubmissionStore;
pub use models::{
    AnalyticsEvent, ContactDetails, ContactStatus, ContactSubmission, InternalScore,
    QuestionnaireResponse, ResponseStatus,
};

pub const DEFAULT_PAGE_LIMIT: usize = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
}

/// Status/watched filter plus skip/limit paging for admin listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter<S> {
    pub status: Option<S>,
    pub watched: Option<bool>,
    pub skip: usize,
    pub limit: usize,
}

impl<S> Default for ListFilter<S> {
    fn default() -> Self {
        Self {
            status: None,
            watched: None,
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl<S> ListFilter<S> {
    /// Every record, unpaged.
    pub fn all() -> Self {
        Self {
            limit: usize::MAX,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionnaireUpdate {
    pub status: Option<ResponseStatus>,
    pub internal_notes: Option<String>,
    pub internal_score: Option<InternalScore>,
    pub watched: Option<bool>,
}

impl QuestionnaireUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.internal_notes.is_none()
            && self.internal_score.is_none()
            && self.watched.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactUpdate {
    pub status: Option<ContactStatus>,
    pub internal_notes: Option<String>,
    pub watched: Option<bool>,
}

impl ContactUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.internal_notes.is_none() && self.watched.is_none()
    }
}

#[async_trait]
pub trait SubmissionStore: Send + Sync + 'static {
    async fn insert_questionnaire(&self, response: QuestionnaireResponse);
    async fn list_questionnaires(
        &self,
        filter: &ListFilter<ResponseStatus>,
    ) -> Vec<QuestionnaireResponse>;
    async fn get_questionnaire(&self, id: Uuid) -> Result<QuestionnaireResponse, StoreError>;
    async fn update_questionnaire(
        &self,
        id: Uuid,
        update: QuestionnaireUpdate,
    ) -> Result<(), StoreError>;
    /// Hard delete, for erasure requests.
    async fn delete_questionnaire(&self, id: Uuid) -> Result<(), StoreError>;

    async fn insert_contact(&self, submission: ContactSubmission);
    async fn list_contacts(&self, filter: &ListFilter<ContactStatus>) -> Vec<ContactSubmission>;
    async fn get_contact(&self, id: Uuid) -> Result<ContactSubmission, StoreError>;
    async fn update_contact(&self, id: Uuid, update: ContactUpdate) -> Result<(), StoreError>;
    async fn delete_contact(&self, id: Uuid) -> Result<(), StoreError>;

    async fn insert_event(&self, event: AnalyticsEvent);
}
