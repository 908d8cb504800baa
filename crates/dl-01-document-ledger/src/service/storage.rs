//! # Ledger Store Implementation
//!
//! Implements the `LedgerStore` trait: sequenced append, lookups and the
//! single status mutation path.

use super::helpers::index_error;
use super::*;
use crate::domain::entities::{DocumentRecord, ReviewOutcome};
use crate::domain::errors::LedgerError;
use crate::domain::lifecycle::{apply_review, authorize_review};
use crate::domain::value_objects::{ContentDigest, KeyPrefix, SequenceNumber, TxId};
use crate::ports::inbound::LedgerStore;
use crate::ports::outbound::BatchOperation;
use shared_types::Principal;

impl<KV, BL, HS, IG, TS, RC> LedgerStore for DocumentLedgerService<KV, BL, HS, IG, TS, RC>
where
    KV: KeyValueStore,
    BL: BlobStore,
    HS: ContentHasher,
    IG: TxIdGenerator,
    TS: TimeSource,
    RC: RecordCodec,
{
    fn append(&self, mut record: DocumentRecord) -> LedgerResult<SequenceNumber> {
        if !record.is_pending() || record.review.is_some() {
            return Err(LedgerError::validation(
                "only fresh pending records can be appended",
            ));
        }
        if record.id.as_str().trim().is_empty() {
            return Err(LedgerError::validation("transaction id is required"));
        }

        let mut state = self.write_state()?;

        let record_key = KeyPrefix::record_key(&record.id);
        if state.index.contains(&record.id) || state.kv_store.exists(&record_key)? {
            #[cfg(feature = "tracing-log")]
            tracing::error!(
                tx_id = %record.id,
                "[dl-01] 🚨 Duplicate transaction id, append refused"
            );
            return Err(LedgerError::DuplicateId { id: record.id });
        }

        let sequence = state.index.next_sequence();
        record.sequence_number = sequence;

        let data = self.codec.encode(&record).map_err(LedgerError::from)?;
        let id_bytes = record.id.as_str().as_bytes().to_vec();

        // Record, both secondary indexes and the counter land together or not at all.
        let operations = vec![
            BatchOperation::put(record_key, data),
            BatchOperation::put(
                KeyPrefix::digest_key(&record.digest, sequence),
                id_bytes.clone(),
            ),
            BatchOperation::put(
                KeyPrefix::submitter_key(&record.submitter_id, sequence),
                id_bytes,
            ),
            BatchOperation::put(KeyPrefix::sequence_key(), sequence.to_be_bytes().to_vec()),
        ];
        state.kv_store.atomic_batch_write(operations)?;

        #[cfg(feature = "tracing-log")]
        let (tx_id, digest) = (record.id.clone(), record.digest);

        state.index.insert(record).map_err(index_error)?;

        #[cfg(feature = "tracing-log")]
        tracing::info!(
            tx_id = %tx_id,
            sequence = sequence,
            digest = %digest,
            "[dl-01] ✅ Record appended"
        );

        Ok(sequence)
    }

    fn get(&self, id: &TxId) -> LedgerResult<DocumentRecord> {
        #[cfg(feature = "tracing-log")]
        tracing::debug!(tx_id = %id, "[dl-01] Lookup by transaction id");

        let state = self.read_state()?;
        state
            .index
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found(id))
    }

    fn find_by_digest(&self, digest: &ContentDigest) -> LedgerResult<DocumentRecord> {
        #[cfg(feature = "tracing-log")]
        tracing::debug!(digest = %digest, "[dl-01] Lookup by digest");

        let state = self.read_state()?;
        state
            .index
            .first_by_digest(digest)
            .cloned()
            .ok_or_else(|| LedgerError::not_found(digest))
    }

    fn list_by(
        &self,
        predicate: &dyn Fn(&DocumentRecord) -> bool,
    ) -> LedgerResult<Vec<DocumentRecord>> {
        self.collect_newest_first(predicate)
    }

    fn update_status(
        &self,
        id: &TxId,
        outcome: ReviewOutcome,
        reviewer: &Principal,
        comment: &str,
    ) -> LedgerResult<DocumentRecord> {
        let mut state = self.write_state()?;

        let current = authorize_review(id, state.index.get(id), reviewer, &self.policy)
            .inspect_err(|_err| {
                #[cfg(feature = "tracing-log")]
                tracing::warn!(
                    tx_id = %id,
                    reviewer = %reviewer.id,
                    error = %_err,
                    "[dl-01] ⛔ Review refused"
                );
            })?;

        let reviewed = apply_review(current, outcome, reviewer, comment, self.time_source.now());

        let data = self.codec.encode(&reviewed).map_err(LedgerError::from)?;
        state
            .kv_store
            .atomic_batch_write(vec![BatchOperation::put(KeyPrefix::record_key(id), data)])?;

        state
            .index
            .replace(reviewed.clone())
            .map_err(index_error)?;

        #[cfg(feature = "tracing-log")]
        tracing::info!(
            tx_id = %id,
            sequence = reviewed.sequence_number,
            status = %reviewed.status,
            reviewer = %reviewer.id,
            "[dl-01] 📝 Record reviewed"
        );

        Ok(reviewed)
    }

    fn len(&self) -> LedgerResult<usize> {
        Ok(self.read_state()?.index.len())
    }
}
