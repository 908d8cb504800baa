//! # Ledger Index
//!
//! In-memory view of every record, rebuilt from the key-value store on open.
//!
//! Sequence numbers start at 1 and are gap-free, so a record's position in
//! `records` is always `sequence_number - 1`. Secondary indexes hold those
//! positions in ascending sequence order.

use crate::domain::entities::DocumentRecord;
use crate::domain::value_objects::{ContentDigest, SequenceNumber, TxId};
use shared_types::PrincipalId;
use std::collections::HashMap;

/// Reasons an index mutation was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Id already present.
    DuplicateId(TxId),
    /// Sequence number is not the next one.
    SequenceGap {
        expected: SequenceNumber,
        actual: SequenceNumber,
    },
    /// Replacement targets an id that is not indexed.
    UnknownId(TxId),
    /// Replacement would alter an immutable field.
    ImmutableFieldChanged(TxId),
}

/// Records plus id, digest and submitter indexes.
#[derive(Debug, Clone, Default)]
pub struct LedgerIndex {
    records: Vec<DocumentRecord>,
    by_id: HashMap<TxId, usize>,
    by_digest: HashMap<ContentDigest, Vec<usize>>,
    by_submitter: HashMap<PrincipalId, Vec<usize>>,
}

impl LedgerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from records in any order. Fails unless sequences are `1..=n`
    /// and ids are unique.
    pub fn from_records(mut records: Vec<DocumentRecord>) -> Result<Self, IndexError> {
        records.sort_by_key(|r| r.sequence_number);
        let mut index = Self::new();
        for record in records {
            index.insert(record)?;
        }
        Ok(index)
    }

    /// Sequence number the next append must carry.
    pub fn next_sequence(&self) -> SequenceNumber {
        self.records.len() as SequenceNumber + 1
    }

    /// Highest assigned sequence number (0 when empty).
    pub fn latest_sequence(&self) -> SequenceNumber {
        self.records.len() as SequenceNumber
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &TxId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Append a record carrying the next sequence number.
    pub fn insert(&mut self, record: DocumentRecord) -> Result<(), IndexError> {
        if self.by_id.contains_key(&record.id) {
            return Err(IndexError::DuplicateId(record.id));
        }
        let expected = self.next_sequence();
        if record.sequence_number != expected {
            return Err(IndexError::SequenceGap {
                expected,
                actual: record.sequence_number,
            });
        }

        let pos = self.records.len();
        self.by_id.insert(record.id.clone(), pos);
        self.by_digest.entry(record.digest).or_default().push(pos);
        self.by_submitter
            .entry(record.submitter_id.clone())
            .or_default()
            .push(pos);
        self.records.push(record);
        Ok(())
    }

    /// Swap in an updated copy of an existing record. Only status and review
    /// fields may differ.
    pub fn replace(&mut self, record: DocumentRecord) -> Result<(), IndexError> {
        let pos = *self
            .by_id
            .get(&record.id)
            .ok_or_else(|| IndexError::UnknownId(record.id.clone()))?;
        let current = &self.records[pos];
        let core_unchanged = current.digest == record.digest
            && current.sequence_number == record.sequence_number
            && current.submitter_id == record.submitter_id
            && current.submitted_at == record.submitted_at
            && current.file_name == record.file_name
            && current.file_size_bytes == record.file_size_bytes;
        if !core_unchanged {
            return Err(IndexError::ImmutableFieldChanged(record.id));
        }
        self.records[pos] = record;
        Ok(())
    }

    pub fn get(&self, id: &TxId) -> Option<&DocumentRecord> {
        self.by_id.get(id).map(|&pos| &self.records[pos])
    }

    /// First match by ascending sequence number.
    pub fn first_by_digest(&self, digest: &ContentDigest) -> Option<&DocumentRecord> {
        self.by_digest
            .get(digest)
            .and_then(|positions| positions.first())
            .map(|&pos| &self.records[pos])
    }

    /// Every record, newest first.
    pub fn newest_first(&self) -> impl Iterator<Item = &DocumentRecord> {
        self.records.iter().rev()
    }

    /// Records owned by one submitter, newest first.
    pub fn owned_by_newest_first<'a>(
        &'a self,
        submitter: &PrincipalId,
    ) -> impl Iterator<Item = &'a DocumentRecord> + 'a {
        self.by_submitter
            .get(submitter)
            .map(|positions| positions.as_slice())
            .unwrap_or(&[])
            .iter()
            .rev()
            .map(move |&pos| &self.records[pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RecordStatus;

    fn record(seq: u64, id: &str, digest: u8, owner: &str) -> DocumentRecord {
        DocumentRecord {
            id: TxId::new(id),
            digest: ContentDigest([digest; 32]),
            sequence_number: seq,
            file_name: format!("{}.pdf", id),
            file_size_bytes: 10,
            content_type: "application/pdf".into(),
            title: id.into(),
            description: String::new(),
            submitter_id: PrincipalId::new(owner),
            submitted_at: 1000 + seq,
            status: RecordStatus::Pending,
            review: None,
        }
    }

    #[test]
    fn test_insert_requires_next_sequence() {
        let mut index = LedgerIndex::new();
        index.insert(record(1, "a", 1, "u1")).unwrap();
        let err = index.insert(record(3, "c", 3, "u1")).unwrap_err();
        assert_eq!(
            err,
            IndexError::SequenceGap {
                expected: 2,
                actual: 3
            }
        );
        assert_eq!(index.latest_sequence(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut index = LedgerIndex::new();
        index.insert(record(1, "a", 1, "u1")).unwrap();
        let err = index.insert(record(2, "a", 2, "u1")).unwrap_err();
        assert!(matches!(err, IndexError::DuplicateId(_)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_digest_tie_break_is_lowest_sequence() {
        let mut index = LedgerIndex::new();
        index.insert(record(1, "a", 9, "u1")).unwrap();
        index.insert(record(2, "b", 9, "u2")).unwrap();
        let first = index.first_by_digest(&ContentDigest([9; 32])).unwrap();
        assert_eq!(first.id, TxId::new("a"));
    }

    #[test]
    fn test_owner_listing_newest_first() {
        let mut index = LedgerIndex::new();
        index.insert(record(1, "a", 1, "u1")).unwrap();
        index.insert(record(2, "b", 2, "u2")).unwrap();
        index.insert(record(3, "c", 3, "u1")).unwrap();
        let ids: Vec<_> = index
            .owned_by_newest_first(&PrincipalId::new("u1"))
            .map(|r| r.id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["c", "a"]);
        assert_eq!(
            index
                .owned_by_newest_first(&PrincipalId::new("nobody"))
                .count(),
            0
        );
    }

    #[test]
    fn test_replace_refuses_core_changes() {
        let mut index = LedgerIndex::new();
        index.insert(record(1, "a", 1, "u1")).unwrap();
        let mut tampered = record(1, "a", 2, "u1");
        tampered.status = RecordStatus::Verified;
        assert!(matches!(
            index.replace(tampered),
            Err(IndexError::ImmutableFieldChanged(_))
        ));
    }

    #[test]
    fn test_from_records_detects_gaps() {
        let result =
            LedgerIndex::from_records(vec![record(2, "b", 2, "u1"), record(1, "a", 1, "u1")]);
        assert!(result.is_ok());

        let result =
            LedgerIndex::from_records(vec![record(1, "a", 1, "u1"), record(3, "c", 3, "u1")]);
        assert!(matches!(result, Err(IndexError::SequenceGap { .. })));
    }
}
