//! # Inbound Ports (Driving Ports)
//!
//! Two APIs are exposed:
//!
//! - `LedgerStore` - the sequenced record store. Trusted callers only; it does
//!   not scope results by principal.
//! - `DocumentLedgerApi` - the principal-facing boundary used by presentation
//!   layers. Every access decision is made here.

use crate::domain::entities::{
    DocumentPayload, DocumentRecord, ReviewOutcome, SubmissionMetadata,
};
use crate::domain::errors::LedgerResult;
use crate::domain::query::{LedgerFilter, VerificationResult};
use crate::domain::stats::LedgerStats;
use crate::domain::value_objects::{ContentDigest, SequenceNumber, TxId};
use shared_types::Principal;

/// The sequenced record store.
///
/// `append` and `update_status` are linearized behind one write lock; reads
/// share a read lock and always observe whole records.
pub trait LedgerStore {
    /// Assign the next sequence number and insert the record atomically.
    ///
    /// The incoming `sequence_number` is ignored. The record must be `Pending`
    /// with no review fields.
    ///
    /// ## Errors
    ///
    /// - `DuplicateId`: id already present (fails closed, nothing written)
    /// - `Validation`: record is not a fresh pending record
    /// - `StoreUnavailable`: lock timeout or write failure (nothing written)
    fn append(&self, record: DocumentRecord) -> LedgerResult<SequenceNumber>;

    /// Read a record by transaction id.
    fn get(&self, id: &TxId) -> LedgerResult<DocumentRecord>;

    /// First record with this digest by ascending sequence number.
    fn find_by_digest(&self, digest: &ContentDigest) -> LedgerResult<DocumentRecord>;

    /// Records satisfying `predicate`, newest first.
    fn list_by(
        &self,
        predicate: &dyn Fn(&DocumentRecord) -> bool,
    ) -> LedgerResult<Vec<DocumentRecord>>;

    /// The single mutation path for `status`. Enforces the review state
    /// machine and access policy atomically.
    ///
    /// ## Errors (checked in order)
    ///
    /// - `NotFound`
    /// - `AlreadyReviewed`
    /// - `Forbidden`: reviewer lacks capability, or reviewer is the submitter
    fn update_status(
        &self,
        id: &TxId,
        outcome: ReviewOutcome,
        reviewer: &Principal,
        comment: &str,
    ) -> LedgerResult<DocumentRecord>;

    /// Number of records in the ledger.
    fn len(&self) -> LedgerResult<usize>;

    /// Whether the ledger holds no records.
    fn is_empty(&self) -> LedgerResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// Principal-facing ledger API.
pub trait DocumentLedgerApi {
    /// Hash the payload, mint a transaction id and append a `Pending` record
    /// owned by `principal`.
    ///
    /// ## Errors
    ///
    /// - `Forbidden`: principal is not authenticated
    /// - `Validation`: missing file name, empty or oversized payload,
    ///   disallowed content type, oversized metadata, unknown blob handle
    /// - `HashingFailed`: payload read failed (retryable, nothing written)
    /// - `StoreUnavailable`: retryable, nothing written
    fn submit(
        &self,
        payload: DocumentPayload,
        metadata: SubmissionMetadata,
        principal: &Principal,
    ) -> LedgerResult<DocumentRecord>;

    /// Move a pending record to `Verified` or `Rejected`.
    ///
    /// Non-reviewers receive `Forbidden` without learning whether `id` exists.
    fn review(
        &self,
        id: &TxId,
        outcome: ReviewOutcome,
        comment: &str,
        principal: &Principal,
    ) -> LedgerResult<DocumentRecord>;

    /// Look a document up by digest, transaction id or file name fragment.
    ///
    /// A miss is `found == false`. A blank query is a `Validation` error.
    fn verify(&self, query: &str) -> LedgerResult<VerificationResult>;

    /// Records submitted by `principal`, newest first.
    fn list_mine(&self, principal: &Principal) -> LedgerResult<Vec<DocumentRecord>>;

    /// Pending records `principal` may review (excludes their own), newest first.
    fn list_pending_for_review(&self, principal: &Principal)
        -> LedgerResult<Vec<DocumentRecord>>;

    /// Records already reviewed, newest first. Reviewers only.
    fn list_reviewed(&self, principal: &Principal) -> LedgerResult<Vec<DocumentRecord>>;

    /// Ledger viewer: records in the principal's scope matching `filter`.
    fn browse_ledger(
        &self,
        principal: &Principal,
        filter: &LedgerFilter,
    ) -> LedgerResult<Vec<DocumentRecord>>;

    /// Status counts over the principal's scope.
    fn ledger_stats(&self, principal: &Principal) -> LedgerResult<LedgerStats>;

    /// Fetch one record. Owners and reviewers only.
    fn record(&self, principal: &Principal, id: &TxId) -> LedgerResult<DocumentRecord>;
}
