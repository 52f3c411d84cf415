//! Aggregated counts and percentages for the admin overview.
//!
//! Only distributions are reported, never individual records.

use serde::Serialize;

use crate::store::{ContactStatus, ContactSubmission, QuestionnaireResponse, ResponseStatus};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bucket {
    pub count: usize,
    /// Share of the total, in percent, rounded to one decimal.
    pub percentage: f64,
}

impl Bucket {
    pub fn of(count: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0.0
        } else {
            (count as f64 * 1000.0 / total as f64).round() / 10.0
        };
        Self { count, percentage }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseStatusBreakdown {
    pub unreviewed: Bucket,
    pub reviewed: Bucket,
    pub archived: Bucket,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsentBreakdown {
    pub yes: Bucket,
    pub no: Bucket,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionnaireStats {
    pub total: usize,
    pub by_status: ResponseStatusBreakdown,
    /// Split on whether the respondent asked to be contacted.
    pub contact_consent: ConsentBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactStatusBreakdown {
    pub new: Bucket,
    pub reviewed: Bucket,
    pub archived: Bucket,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactStats {
    pub total: usize,
    pub by_status: ContactStatusBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminStats {
    pub questionnaire: QuestionnaireStats,
    pub contact: ContactStats,
}

pub fn questionnaire_stats(responses: &[QuestionnaireResponse]) -> QuestionnaireStats {
    let total = responses.len();
    let with_status = |status: ResponseStatus| responses.iter().filter(|r| r.status == status).count();
    let wants_contact = responses.iter().filter(|r| r.wants_contact).count();

    QuestionnaireStats {
        total,
        by_status: ResponseStatusBreakdown {
            unreviewed: Bucket::of(with_status(ResponseStatus::Unreviewed), total),
            reviewed: Bucket::of(with_status(ResponseStatus::Reviewed), total),
            archived: Bucket::of(with_status(ResponseStatus::Archived), total),
        },
        contact_consent: ConsentBreakdown {
            yes: Bucket::of(wants_contact, total),
            no: Bucket::of(total - wants_contact, total),
        },
    }
}

pub fn contact_stats(contacts: &[ContactSubmission]) -> ContactStats {
    let total = contacts.len();
    let with_status = |status: ContactStatus| contacts.iter().filter(|c| c.status == status).count();

    ContactStats {
        total,
        by_status: ContactStatusBreakdown {
            new: Bucket::of(with_status(ContactStatus::New), total),
            reviewed: Bucket::of(with_status(ContactStatus::Reviewed), total),
            archived: Bucket::of(with_status(ContactStatus::Archived), total),
        },
    }
}

pub fn summarize(
    responses: &[QuestionnaireResponse],
    contacts: &[ContactSubmission],
) -> AdminStats {
    AdminStats {
        questionnaire: questionnaire_stats(responses),
        contact: contact_stats(contacts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ContactDetails;
    use std::collections::BTreeMap;

    fn response(status: ResponseStatus, wants_contact: bool) -> QuestionnaireResponse {
        let mut r = QuestionnaireResponse::new("s", Default::default(), BTreeMap::new(), None, wants_contact);
        r.status = status;
        r
    }

    #[test]
    fn test_bucket_rounds_to_one_decimal() {
        assert_eq!(Bucket::of(1, 3).percentage, 33.3);
        assert_eq!(Bucket::of(2, 3).percentage, 66.7);
        assert_eq!(Bucket::of(3, 3).percentage, 100.0);
    }

    #[test]
    fn test_empty_totals_are_zero_percent() {
        let stats = summarize(&[], &[]);
        assert_eq!(stats.questionnaire.total, 0);
        assert_eq!(stats.questionnaire.by_status.unreviewed, Bucket { count: 0, percentage: 0.0 });
        assert_eq!(stats.contact.by_status.new.percentage, 0.0);
    }

    #[test]
    fn test_questionnaire_distribution() {
        let responses = vec![
            response(ResponseStatus::Unreviewed, true),
            response(ResponseStatus::Unreviewed, false),
            response(ResponseStatus::Reviewed, false),
            response(ResponseStatus::Archived, false),
        ];
        let stats = questionnaire_stats(&responses);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_status.unreviewed, Bucket { count: 2, percentage: 50.0 });
        assert_eq!(stats.by_status.reviewed, Bucket { count: 1, percentage: 25.0 });
        assert_eq!(stats.by_status.archived, Bucket { count: 1, percentage: 25.0 });
        assert_eq!(stats.contact_consent.yes, Bucket { count: 1, percentage: 25.0 });
        assert_eq!(stats.contact_consent.no, Bucket { count: 3, percentage: 75.0 });
    }

    #[test]
    fn test_contact_distribution_serializes_by_status_keys() {
        let mut reviewed = ContactSubmission::new(ContactDetails::default());
        reviewed.status = ContactStatus::Reviewed;
        let contacts = vec![ContactSubmission::new(ContactDetails::default()), reviewed];

        let json = serde_json::to_value(contact_stats(&contacts)).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["by_status"]["new"]["count"], 1);
        assert_eq!(json["by_status"]["reviewed"]["percentage"], 50.0);
        assert_eq!(json["by_status"]["archived"]["count"], 0);
    }
}
