//! # Record Lifecycle
//!
//! The review state machine. `Pending` is the only initial state;
//! `Verified` and `Rejected` are terminal.
//!
//! Preconditions of a review, checked in this order:
//!
//! 1. record exists (`NotFound`)
//! 2. record is `Pending` (`AlreadyReviewed`)
//! 3. reviewer holds reviewer capability (`Forbidden`)
//! 4. reviewer is not the submitter (`Forbidden`)

use crate::domain::entities::{DocumentRecord, RecordStatus, ReviewOutcome, ReviewStamp};
use crate::domain::errors::{LedgerError, LedgerResult};
use crate::domain::policy::AccessPolicy;
use crate::domain::value_objects::TxId;
use shared_types::{Principal, Timestamp};

/// Whether `from -> to` is a legal status transition.
pub fn can_transition(from: RecordStatus, to: RecordStatus) -> bool {
    matches!(
        (from, to),
        (RecordStatus::Pending, RecordStatus::Verified)
            | (RecordStatus::Pending, RecordStatus::Rejected)
    )
}

/// Check every review precondition against the current record.
pub fn authorize_review<'a>(
    id: &TxId,
    record: Option<&'a DocumentRecord>,
    reviewer: &Principal,
    policy: &AccessPolicy,
) -> LedgerResult<&'a DocumentRecord> {
    let record = record.ok_or_else(|| LedgerError::not_found(id))?;

    if record.status != RecordStatus::Pending {
        return Err(LedgerError::AlreadyReviewed {
            id: id.clone(),
            status: record.status,
        });
    }

    if !policy.can_review(reviewer) {
        return Err(LedgerError::Forbidden {
            reason: "principal lacks reviewer capability",
        });
    }

    if record.submitter_id == reviewer.id {
        return Err(LedgerError::Forbidden {
            reason: "self-review is not permitted",
        });
    }

    Ok(record)
}

/// Produce the reviewed copy of a pending record.
///
/// Callers must have passed `authorize_review` on the same snapshot.
pub fn apply_review(
    record: &DocumentRecord,
    outcome: ReviewOutcome,
    reviewer: &Principal,
    comment: &str,
    now: Timestamp,
) -> DocumentRecord {
    debug_assert!(can_transition(record.status, outcome.status()));
    let mut reviewed = record.clone();
    reviewed.status = outcome.status();
    reviewed.review = Some(ReviewStamp {
        reviewer_id: reviewer.id.clone(),
        reviewer_institute: reviewer.institute_name.clone(),
        reviewed_at: now,
        comment: comment.to_string(),
    });
    reviewed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ContentDigest;
    use shared_types::PrincipalId;

    fn pending(submitter: &str) -> DocumentRecord {
        DocumentRecord {
            id: TxId::new("tx_01"),
            digest: ContentDigest([1; 32]),
            sequence_number: 1,
            file_name: "A.pdf".into(),
            file_size_bytes: 3,
            content_type: "application/pdf".into(),
            title: "A".into(),
            description: String::new(),
            submitter_id: PrincipalId::new(submitter),
            submitted_at: 100,
            status: RecordStatus::Pending,
            review: None,
        }
    }

    #[test]
    fn test_transition_table() {
        assert!(can_transition(RecordStatus::Pending, RecordStatus::Verified));
        assert!(can_transition(RecordStatus::Pending, RecordStatus::Rejected));
        assert!(!can_transition(RecordStatus::Verified, RecordStatus::Rejected));
        assert!(!can_transition(RecordStatus::Rejected, RecordStatus::Verified));
        assert!(!can_transition(RecordStatus::Pending, RecordStatus::Pending));
    }

    #[test]
    fn test_missing_record_is_not_found() {
        let policy = AccessPolicy::new();
        let reviewer = Principal::institute("v1", "Vic", "Uni");
        let result = authorize_review(&TxId::new("tx_x"), None, &reviewer, &policy);
        assert!(matches!(result, Err(LedgerError::NotFound { .. })));
    }

    #[test]
    fn test_terminal_checked_before_capability() {
        let policy = AccessPolicy::new();
        let mut record = pending("u1");
        record.status = RecordStatus::Rejected;
        let user = Principal::user("u2", "Ula");
        let result = authorize_review(&record.id.clone(), Some(&record), &user, &policy);
        assert!(matches!(result, Err(LedgerError::AlreadyReviewed { .. })));
    }

    #[test]
    fn test_self_review_forbidden_even_for_institutes() {
        let policy = AccessPolicy::new();
        let record = pending("v1");
        let reviewer = Principal::institute("v1", "Vic", "Uni");
        let result = authorize_review(&record.id.clone(), Some(&record), &reviewer, &policy);
        assert!(matches!(result, Err(LedgerError::Forbidden { .. })));
    }

    #[test]
    fn test_apply_review_fills_stamp() {
        let record = pending("u1");
        let reviewer = Principal::institute("v1", "Vic", "State Uni");
        let reviewed = apply_review(&record, ReviewOutcome::Verified, &reviewer, "ok", 500);

        assert_eq!(reviewed.status, RecordStatus::Verified);
        assert_eq!(reviewed.reviewer_id(), Some(&PrincipalId::new("v1")));
        assert_eq!(reviewed.reviewed_at(), Some(500));
        assert_eq!(reviewed.review_comment(), Some("ok"));
        assert!(reviewed.review_fields_consistent());
        // Immutable core untouched
        assert_eq!(reviewed.digest, record.digest);
        assert_eq!(reviewed.sequence_number, record.sequence_number);
    }
}
