//! # Document Ledger Service - Helper Methods
//!
//! Index loading, lock acquisition, input validation and payload hashing.

use super::*;
use crate::domain::entities::{DocumentPayload, DocumentRecord, SubmissionMetadata};
use crate::domain::errors::LedgerError;
use crate::domain::index::IndexError;
use crate::domain::value_objects::{KeyPrefix, SequenceNumber};
use crate::ports::outbound::HashedPayload;
use parking_lot::{RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::io::Read;

/// Rebuild the in-memory index from the `r:` records and check it against
/// the persisted sequence counter.
pub(crate) fn load_index<KV, RC>(kv_store: &KV, codec: &RC) -> LedgerResult<LedgerIndex>
where
    KV: KeyValueStore,
    RC: RecordCodec,
{
    let entries = kv_store.prefix_scan(KeyPrefix::Record.as_bytes())?;

    let mut records = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let record = codec.decode(&value).map_err(|e| e.at_key(&key))?;
        if !record.review_fields_consistent() {
            return Err(LedgerError::Inconsistent {
                message: format!(
                    "record {} has status {} but review fields disagree",
                    record.id, record.status
                ),
            });
        }
        records.push(record);
    }

    let index = LedgerIndex::from_records(records).map_err(index_error)?;

    let counter = read_counter(kv_store)?;
    if counter != index.latest_sequence() {
        return Err(LedgerError::Inconsistent {
            message: format!(
                "sequence counter is {} but {} records are stored",
                counter,
                index.len()
            ),
        });
    }

    check_secondary_keys(kv_store, &index)?;

    if index.is_empty() {
        #[cfg(feature = "tracing-log")]
        tracing::info!("[dl-01] No existing records found in storage");
    } else {
        #[cfg(feature = "tracing-log")]
        tracing::info!(
            "[dl-01] 💾 Loaded {} records from storage (sequence 1 to {})",
            index.len(),
            index.latest_sequence()
        );
    }

    Ok(index)
}

/// Every record must have exactly its `d:` and `s:` entries, each pointing
/// back at the record's id, and no other entries may exist.
fn check_secondary_keys<KV>(kv_store: &KV, index: &LedgerIndex) -> LedgerResult<()>
where
    KV: KeyValueStore,
{
    type KeyFor = fn(&DocumentRecord) -> Vec<u8>;
    let secondaries: [(&str, KeyPrefix, KeyFor); 2] = [
        ("digest", KeyPrefix::ByDigest, |r: &DocumentRecord| {
            KeyPrefix::digest_key(&r.digest, r.sequence_number)
        }),
        ("submitter", KeyPrefix::BySubmitter, |r: &DocumentRecord| {
            KeyPrefix::submitter_key(&r.submitter_id, r.sequence_number)
        }),
    ];

    for (name, prefix, key_for) in secondaries {
        let mut stored: HashMap<Vec<u8>, Vec<u8>> =
            kv_store.prefix_scan(prefix.as_bytes())?.into_iter().collect();

        for record in index.newest_first() {
            let problem = match stored.remove(&key_for(record)) {
                Some(id) if id == record.id.as_str().as_bytes() => continue,
                Some(_) => "points at another record",
                None => "is missing",
            };
            return Err(LedgerError::Inconsistent {
                message: format!("{} index entry for {} {}", name, record.id, problem),
            });
        }

        if !stored.is_empty() {
            return Err(LedgerError::Inconsistent {
                message: format!("{} stray {} index entries", stored.len(), name),
            });
        }
    }
    Ok(())
}

/// Last assigned sequence number (0 when nothing was ever appended).
fn read_counter<KV: KeyValueStore>(kv_store: &KV) -> LedgerResult<SequenceNumber> {
    let key = KeyPrefix::sequence_key();
    match kv_store.get(&key)? {
        None => Ok(0),
        Some(bytes) => {
            let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                LedgerError::Inconsistent {
                    message: format!("sequence counter has {} bytes, expected 8", bytes.len()),
                }
            })?;
            Ok(SequenceNumber::from_be_bytes(raw))
        }
    }
}

pub(crate) fn index_error(err: IndexError) -> LedgerError {
    match err {
        IndexError::DuplicateId(id) => LedgerError::DuplicateId { id },
        IndexError::SequenceGap { expected, actual } => LedgerError::Inconsistent {
            message: format!("expected sequence {}, found {}", expected, actual),
        },
        IndexError::UnknownId(id) => LedgerError::Inconsistent {
            message: format!("record {} missing from index", id),
        },
        IndexError::ImmutableFieldChanged(id) => LedgerError::Inconsistent {
            message: format!("immutable fields of record {} changed", id),
        },
    }
}

impl<KV, BL, HS, IG, TS, RC> DocumentLedgerService<KV, BL, HS, IG, TS, RC>
where
    KV: KeyValueStore,
    BL: BlobStore,
    HS: ContentHasher,
    IG: TxIdGenerator,
    TS: TimeSource,
    RC: RecordCodec,
{
    /// Shared access, bounded by `lock_timeout`.
    pub(crate) fn read_state(&self) -> LedgerResult<RwLockReadGuard<'_, LedgerState<KV>>> {
        self.state
            .try_read_for(self.config.lock_timeout)
            .ok_or_else(|| self.lock_timeout("read"))
    }

    /// Exclusive access, bounded by `lock_timeout`.
    pub(crate) fn write_state(&self) -> LedgerResult<RwLockWriteGuard<'_, LedgerState<KV>>> {
        self.state
            .try_write_for(self.config.lock_timeout)
            .ok_or_else(|| self.lock_timeout("write"))
    }

    fn lock_timeout(&self, mode: &str) -> LedgerError {
        #[cfg(feature = "tracing-log")]
        tracing::warn!(
            "[dl-01] ⏱️ Timed out after {:?} waiting for ledger {} lock",
            self.config.lock_timeout,
            mode
        );
        LedgerError::StoreUnavailable {
            message: format!(
                "timed out after {:?} waiting for ledger {} lock",
                self.config.lock_timeout, mode
            ),
        }
    }

    /// Clone the records a read lock admits, newest first.
    pub(crate) fn collect_newest_first<F>(&self, keep: F) -> LedgerResult<Vec<DocumentRecord>>
    where
        F: Fn(&DocumentRecord) -> bool,
    {
        let state = self.read_state()?;
        Ok(state
            .index
            .newest_first()
            .filter(|r| keep(r))
            .cloned()
            .collect())
    }

    /// Check and normalize submission metadata. Blank titles become the
    /// file name.
    pub(crate) fn validate_metadata(
        &self,
        metadata: SubmissionMetadata,
    ) -> LedgerResult<SubmissionMetadata> {
        let file_name = metadata.file_name.trim().to_string();
        if file_name.is_empty() {
            return Err(LedgerError::validation("file name is required"));
        }

        let content_type = metadata.content_type.trim().to_string();
        if !self.config.accepts_content_type(&content_type) {
            return Err(LedgerError::validation(format!(
                "content type '{}' is not accepted (allowed: {})",
                content_type,
                self.config.allowed_content_types.join(", ")
            )));
        }

        let title = match metadata.title.trim() {
            "" => file_name.clone(),
            title => title.to_string(),
        };
        check_len("title", &title, self.config.max_title_len)?;
        check_len(
            "description",
            &metadata.description,
            self.config.max_description_len,
        )?;

        Ok(SubmissionMetadata {
            file_name,
            content_type,
            title,
            description: metadata.description,
        })
    }

    pub(crate) fn validate_comment(&self, comment: &str) -> LedgerResult<()> {
        check_len("comment", comment, self.config.max_comment_len)
    }

    /// Digest and size of a payload. Blob payloads are streamed and never
    /// read past `max_payload_bytes + 1`.
    pub(crate) fn hash_payload(&self, payload: &DocumentPayload) -> LedgerResult<HashedPayload> {
        let limit = self.config.max_payload_bytes;

        let hashed = match payload {
            DocumentPayload::Inline(bytes) => {
                let size_bytes = bytes.len() as u64;
                check_payload_size(size_bytes, limit)?;
                HashedPayload {
                    digest: self.hasher.digest(bytes),
                    size_bytes,
                }
            }
            DocumentPayload::Blob(handle) => {
                let reader = self.blobs.open(handle)?;
                let mut bounded = reader.take(limit.saturating_add(1));
                let hashed = self.hasher.digest_reader(&mut bounded)?;
                check_payload_size(hashed.size_bytes, limit)?;
                hashed
            }
        };

        #[cfg(feature = "tracing-log")]
        tracing::debug!(
            digest = %hashed.digest,
            size_bytes = hashed.size_bytes,
            "[dl-01] Payload hashed"
        );

        Ok(hashed)
    }
}

fn check_len(field: &str, value: &str, max: usize) -> LedgerResult<()> {
    let len = value.chars().count();
    if len > max {
        return Err(LedgerError::validation(format!(
            "{} is {} characters, limit is {}",
            field, len, max
        )));
    }
    Ok(())
}

fn check_payload_size(size_bytes: u64, limit: u64) -> LedgerResult<()> {
    if size_bytes == 0 {
        return Err(LedgerError::validation("payload is empty"));
    }
    if size_bytes > limit {
        return Err(LedgerError::validation(format!(
            "payload exceeds {} bytes",
            limit
        )));
    }
    Ok(())
}
