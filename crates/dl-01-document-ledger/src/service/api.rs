//! # Document Ledger API Implementation
//!
//! Implements `DocumentLedgerApi`. Every access decision is taken here from
//! the authenticated principal; callers never supply ownership filters.

use super::*;
use crate::domain::entities::{
    DocumentPayload, DocumentRecord, RecordStatus, ReviewOutcome, SubmissionMetadata,
};
use crate::domain::errors::LedgerError;
use crate::domain::policy::RecordScope;
use crate::domain::query::{browse, resolve, LedgerFilter, VerificationResult};
use crate::domain::stats::LedgerStats;
use crate::domain::value_objects::TxId;
use crate::ports::inbound::{DocumentLedgerApi, LedgerStore};
use shared_types::Principal;

impl<KV, BL, HS, IG, TS, RC> DocumentLedgerService<KV, BL, HS, IG, TS, RC>
where
    KV: KeyValueStore,
    BL: BlobStore,
    HS: ContentHasher,
    IG: TxIdGenerator,
    TS: TimeSource,
    RC: RecordCodec,
{
    fn forbidden(&self, principal: &Principal, operation: &str, reason: &'static str) -> LedgerError {
        #[cfg(feature = "tracing-log")]
        tracing::warn!(
            principal = %principal.id,
            role = %principal.role,
            "[dl-01] ⛔ {} forbidden: {}",
            operation,
            reason
        );
        #[cfg(not(feature = "tracing-log"))]
        let _ = (principal, operation);
        LedgerError::Forbidden { reason }
    }

    fn scope_for(&self, principal: &Principal, operation: &str) -> LedgerResult<RecordScope> {
        self.policy
            .scope_for(principal)
            .ok_or_else(|| self.forbidden(principal, operation, "principal is not authenticated"))
    }

    fn require_reviewer(&self, principal: &Principal, operation: &str) -> LedgerResult<()> {
        if self.policy.can_review(principal) {
            Ok(())
        } else {
            Err(self.forbidden(
                principal,
                operation,
                "principal lacks reviewer capability",
            ))
        }
    }
}

impl<KV, BL, HS, IG, TS, RC> DocumentLedgerApi for DocumentLedgerService<KV, BL, HS, IG, TS, RC>
where
    KV: KeyValueStore,
    BL: BlobStore,
    HS: ContentHasher,
    IG: TxIdGenerator,
    TS: TimeSource,
    RC: RecordCodec,
{
    fn submit(
        &self,
        payload: DocumentPayload,
        metadata: SubmissionMetadata,
        principal: &Principal,
    ) -> LedgerResult<DocumentRecord> {
        if !self.policy.can_submit(principal) {
            return Err(self.forbidden(principal, "submit", "principal is not authenticated"));
        }

        let metadata = self.validate_metadata(metadata)?;

        // Hash before taking the lock; a failure here leaves no trace.
        let hashed = self.hash_payload(&payload)?;

        let mut record = DocumentRecord {
            id: self.id_generator.new_id(),
            digest: hashed.digest,
            sequence_number: 0,
            file_name: metadata.file_name,
            file_size_bytes: hashed.size_bytes,
            content_type: metadata.content_type,
            title: metadata.title,
            description: metadata.description,
            submitter_id: principal.id.clone(),
            submitted_at: self.time_source.now(),
            status: RecordStatus::Pending,
            review: None,
        };

        record.sequence_number = self.append(record.clone())?;
        Ok(record)
    }

    fn review(
        &self,
        id: &TxId,
        outcome: ReviewOutcome,
        comment: &str,
        principal: &Principal,
    ) -> LedgerResult<DocumentRecord> {
        // Capability first: non-reviewers learn nothing about `id`.
        self.require_reviewer(principal, "review")?;
        self.validate_comment(comment)?;
        self.update_status(id, outcome, principal, comment)
    }

    fn verify(&self, query: &str) -> LedgerResult<VerificationResult> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LedgerError::validation("verification query is empty"));
        }

        let now = self.time_source.now();
        let state = self.read_state()?;
        let result = match resolve(&state.index, query) {
            Some((kind, record)) => VerificationResult::hit(query, kind, record.clone(), now),
            None => VerificationResult::miss(query, now),
        };

        #[cfg(feature = "tracing-log")]
        tracing::debug!(
            found = result.found,
            matched_by = ?result.matched_by,
            "[dl-01] 🔍 Verification query resolved"
        );

        Ok(result)
    }

    fn list_mine(&self, principal: &Principal) -> LedgerResult<Vec<DocumentRecord>> {
        if !principal.is_authenticated() {
            return Err(self.forbidden(principal, "list_mine", "principal is not authenticated"));
        }

        let state = self.read_state()?;
        Ok(state
            .index
            .owned_by_newest_first(&principal.id)
            .cloned()
            .collect())
    }

    fn list_pending_for_review(
        &self,
        principal: &Principal,
    ) -> LedgerResult<Vec<DocumentRecord>> {
        self.require_reviewer(principal, "list_pending_for_review")?;
        self.collect_newest_first(|r| r.is_pending() && !r.is_owned_by(&principal.id))
    }

    fn list_reviewed(&self, principal: &Principal) -> LedgerResult<Vec<DocumentRecord>> {
        self.require_reviewer(principal, "list_reviewed")?;
        self.collect_newest_first(|r| r.status.is_terminal())
    }

    fn browse_ledger(
        &self,
        principal: &Principal,
        filter: &LedgerFilter,
    ) -> LedgerResult<Vec<DocumentRecord>> {
        let scope = self.scope_for(principal, "browse_ledger")?;
        let state = self.read_state()?;
        Ok(browse(&state.index, &scope, filter).cloned().collect())
    }

    fn ledger_stats(&self, principal: &Principal) -> LedgerResult<LedgerStats> {
        let scope = self.scope_for(principal, "ledger_stats")?;
        let state = self.read_state()?;
        Ok(state
            .index
            .newest_first()
            .filter(|r| scope.admits(r))
            .collect())
    }

    fn record(&self, principal: &Principal, id: &TxId) -> LedgerResult<DocumentRecord> {
        let scope = self.scope_for(principal, "record")?;
        let state = self.read_state()?;

        match state.index.get(id) {
            Some(record) if self.policy.can_view(principal, record) => Ok(record.clone()),
            None if scope == RecordScope::All => Err(LedgerError::not_found(id)),
            // Owners-only callers cannot tell a foreign record from a missing one.
            _ => Err(self.forbidden(principal, "record", "record is outside the caller's scope")),
        }
    }
}
