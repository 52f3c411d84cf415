//! In-process submission store. Records are kept in insertion order and are
//! lost on restart.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{
    AnalyticsEvent, ContactStatus, ContactSubmission, QuestionnaireResponse, ResponseStatus,
};
use super::{ContactUpdate, ListFilter, QuestionnaireUpdate, StoreError, SubmissionStore};

const RESPONSE: &str = "Response";
const SUBMISSION: &str = "Submission";

#[derive(Debug, Default)]
pub struct InMemorySubmissionStore {
    questionnaires: RwLock<Vec<QuestionnaireResponse>>,
    contacts: RwLock<Vec<ContactSubmission>>,
    events: RwLock<Vec<AnalyticsEvent>>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }
}

fn page<'a, T: Clone + 'a>(items: impl Iterator<Item = &'a T>, skip: usize, limit: usize) -> Vec<T> {
    items.skip(skip).take(limit).cloned().collect()
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn insert_questionnaire(&self, response: QuestionnaireResponse) {
        self.questionnaires.write().await.push(response);
    }

    async fn list_questionnaires(
        &self,
        filter: &ListFilter<ResponseStatus>,
    ) -> Vec<QuestionnaireResponse> {
        let responses = self.questionnaires.read().await;
        let matching = responses.iter().filter(|r| {
            filter.status.is_none_or(|s| r.status == s)
                && filter.watched.is_none_or(|w| r.watched == w)
        });
        page(matching, filter.skip, filter.limit)
    }

    async fn get_questionnaire(&self, id: Uuid) -> Result<QuestionnaireResponse, StoreError> {
        self.questionnaires
            .read()
            .await
            .iter()
            .find(|r| r.response_id == id)
            .cloned()
            .ok_or(StoreError::NotFound(RESPONSE))
    }

    async fn update_questionnaire(
        &self,
        id: Uuid,
        update: QuestionnaireUpdate,
    ) -> Result<(), StoreError> {
        let mut responses = self.questionnaires.write().await;
        let response = responses
            .iter_mut()
            .find(|r| r.response_id == id)
            .ok_or(StoreError::NotFound(RESPONSE))?;

        if let Some(status) = update.status {
            response.status = status;
        }
        if let Some(notes) = update.internal_notes {
            response.internal_notes = notes;
        }
        if let Some(score) = update.internal_score {
            response.internal_score = score;
        }
        if let Some(watched) = update.watched {
            response.watched = watched;
        }
        Ok(())
    }

    async fn delete_questionnaire(&self, id: Uuid) -> Result<(), StoreError> {
        let mut responses = self.questionnaires.write().await;
        let index = responses
            .iter()
            .position(|r| r.response_id == id)
            .ok_or(StoreError::NotFound(RESPONSE))?;
        responses.remove(index);
        Ok(())
    }

    async fn insert_contact(&self, submission: ContactSubmission) {
        self.contacts.write().await.push(submission);
    }

    async fn list_contacts(&self, filter: &ListFilter<ContactStatus>) -> Vec<ContactSubmission> {
        let contacts = self.contacts.read().await;
        let matching = contacts.iter().filter(|c| {
            filter.status.is_none_or(|s| c.status == s)
                && filter.watched.is_none_or(|w| c.watched == w)
        });
        page(matching, filter.skip, filter.limit)
    }

    async fn get_contact(&self, id: Uuid) -> Result<ContactSubmission, StoreError> {
        self.contacts
            .read()
            .await
            .iter()
            .find(|c| c.submission_id == id)
            .cloned()
            .ok_or(StoreError::NotFound(SUBMISSION))
    }

    async fn update_contact(&self, id: Uuid, update: ContactUpdate) -> Result<(), StoreError> {
        let mut contacts = self.contacts.write().await;
        let contact = contacts
            .iter_mut()
            .find(|c| c.submission_id == id)
            .ok_or(StoreError::NotFound(SUBMISSION))?;

        if let Some(status) = update.status {
            contact.status = status;
        }
        if let Some(notes) = update.internal_notes {
            contact.internal_notes = notes;
        }
        if let Some(watched) = update.watched {
            contact.watched = watched;
        }
        Ok(())
    }

    async fn delete_contact(&self, id: Uuid) -> Result<(), StoreError> {
        let mut contacts = self.contacts.write().await;
        let index = contacts
            .iter()
            .position(|c| c.submission_id == id)
            .ok_or(StoreError::NotFound(SUBMISSION))?;
        contacts.remove(index);
        Ok(())
    }

    async fn insert_event(&self, event: AnalyticsEvent) {
        self.events.write().await.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::ContactDetails;
    use std::collections::BTreeMap;

    fn response() -> QuestionnaireResponse {
        QuestionnaireResponse::new("session", Default::default(), BTreeMap::new(), None, false)
    }

    fn contact(name: &str) -> ContactSubmission {
        ContactSubmission::new(ContactDetails {
            name: name.to_string(),
            reason: "curious".to_string(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order_and_pages() {
        let store = InMemorySubmissionStore::new();
        let mut ids = Vec::new();
        for _ in 0..5 {
            let r = response();
            ids.push(r.response_id);
            store.insert_questionnaire(r).await;
        }

        let all = store.list_questionnaires(&ListFilter::default()).await;
        assert_eq!(all.iter().map(|r| r.response_id).collect::<Vec<_>>(), ids);

        let filter = ListFilter {
            skip: 1,
            limit: 2,
            ..ListFilter::default()
        };
        let paged = store.list_questionnaires(&filter).await;
        assert_eq!(paged.iter().map(|r| r.response_id).collect::<Vec<_>>(), ids[1..3]);
    }

    #[tokio::test]
    async fn test_filter_by_status_and_watched() {
        let store = InMemorySubmissionStore::new();
        let first = response();
        let first_id = first.response_id;
        store.insert_questionnaire(first).await;
        store.insert_questionnaire(response()).await;

        store
            .update_questionnaire(
                first_id,
                QuestionnaireUpdate {
                    status: Some(ResponseStatus::Reviewed),
                    watched: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let reviewed = store
            .list_questionnaires(&ListFilter {
                status: Some(ResponseStatus::Reviewed),
                ..ListFilter::default()
            })
            .await;
        assert_eq!(reviewed.len(), 1);
        assert_eq!(reviewed[0].response_id, first_id);

        let unwatched = store
            .list_questionnaires(&ListFilter {
                watched: Some(false),
                ..ListFilter::default()
            })
            .await;
        assert_eq!(unwatched.len(), 1);
        assert_ne!(unwatched[0].response_id, first_id);
    }

    #[tokio::test]
    async fn test_update_only_touches_given_fields() {
        let store = InMemorySubmissionStore::new();
        let c = contact("Ada");
        let id = c.submission_id;
        store.insert_contact(c).await;

        store
            .update_contact(
                id,
                ContactUpdate {
                    internal_notes: Some("call back".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stored = store.get_contact(id).await.unwrap();
        assert_eq!(stored.internal_notes, "call back");
        assert_eq!(stored.status, ContactStatus::New);
        assert!(!stored.watched);
    }

    #[tokio::test]
    async fn test_missing_records_report_not_found() {
        let store = InMemorySubmissionStore::new();
        let id = Uuid::new_v4();
        assert_eq!(
            store.get_questionnaire(id).await.unwrap_err(),
            StoreError::NotFound("Response")
        );
        assert_eq!(
            store.delete_contact(id).await.unwrap_err(),
            StoreError::NotFound("Submission")
        );
        assert!(
            store
                .update_contact(id, ContactUpdate::default())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let store = InMemorySubmissionStore::new();
        let c = contact("Grace");
        let id = c.submission_id;
        store.insert_contact(c).await;
        store.insert_contact(contact("Linus")).await;

        store.delete_contact(id).await.unwrap();
        let remaining = store.list_contacts(&ListFilter::all()).await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Linus");
    }
}
