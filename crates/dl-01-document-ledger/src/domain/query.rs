//! # Query Resolution
//!
//! Resolves a free-form lookup key to at most one record.
//!
//! Precedence, first non-empty component wins:
//!
//! 1. exact digest equality (lowest sequence number on ties)
//! 2. exact transaction id equality
//! 3. case-insensitive file name substring (newest record wins)

use crate::domain::entities::{DocumentRecord, RecordStatus};
use crate::domain::index::LedgerIndex;
use crate::domain::policy::RecordScope;
use crate::domain::value_objects::{ContentDigest, TxId};
use serde::{Deserialize, Serialize};
use shared_types::Timestamp;

/// Which component of a query produced the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Digest,
    TransactionId,
    FileName,
}

/// Outcome of `verify`. A miss is a normal result, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub query: String,
    pub found: bool,
    pub matched_by: Option<MatchKind>,
    pub record: Option<DocumentRecord>,
    pub checked_at: Timestamp,
}

impl VerificationResult {
    pub fn hit(query: &str, kind: MatchKind, record: DocumentRecord, now: Timestamp) -> Self {
        Self {
            query: query.to_string(),
            found: true,
            matched_by: Some(kind),
            record: Some(record),
            checked_at: now,
        }
    }

    pub fn miss(query: &str, now: Timestamp) -> Self {
        Self {
            query: query.to_string(),
            found: false,
            matched_by: None,
            record: None,
            checked_at: now,
        }
    }

    /// True when a record was found and a reviewer confirmed it.
    pub fn is_authentic(&self) -> bool {
        self.record
            .as_ref()
            .is_some_and(|r| r.status == RecordStatus::Verified)
    }
}

/// Resolve `query` (already trimmed, non-empty) against the index.
pub fn resolve<'a>(index: &'a LedgerIndex, query: &str) -> Option<(MatchKind, &'a DocumentRecord)> {
    if let Some(digest) = ContentDigest::from_hex(query) {
        if let Some(record) = index.first_by_digest(&digest) {
            return Some((MatchKind::Digest, record));
        }
    }

    if let Some(record) = index.get(&TxId::new(query)) {
        return Some((MatchKind::TransactionId, record));
    }

    let needle = query.to_lowercase();
    index
        .newest_first()
        .find(|r| r.file_name.to_lowercase().contains(&needle))
        .map(|record| (MatchKind::FileName, record))
}

/// Ledger viewer filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerFilter {
    /// Matches title or file name case-insensitively, digest or id by substring.
    pub search: Option<String>,
    /// Only records in this status.
    pub status: Option<RecordStatus>,
}

impl LedgerFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, record: &DocumentRecord) -> bool {
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let lower = term.to_lowercase();
                record.title.to_lowercase().contains(&lower)
                    || record.file_name.to_lowercase().contains(&lower)
                    || record.digest.to_hex().contains(&lower)
                    || record.id.as_str().contains(term)
            }
        }
    }
}

/// Records visible in `scope` that pass `filter`, newest first.
pub fn browse<'a>(
    index: &'a LedgerIndex,
    scope: &'a RecordScope,
    filter: &'a LedgerFilter,
) -> Box<dyn Iterator<Item = &'a DocumentRecord> + 'a> {
    match scope {
        RecordScope::All => Box::new(index.newest_first().filter(move |r| filter.matches(r))),
        RecordScope::OwnedBy(owner) => Box::new(
            index
                .owned_by_newest_first(owner)
                .filter(move |r| filter.matches(r)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::PrincipalId;

    fn record(seq: u64, id: &str, digest: u8, file: &str) -> DocumentRecord {
        DocumentRecord {
            id: TxId::new(id),
            digest: ContentDigest([digest; 32]),
            sequence_number: seq,
            file_name: file.into(),
            file_size_bytes: 10,
            content_type: "application/pdf".into(),
            title: format!("Title {}", id),
            description: String::new(),
            submitter_id: PrincipalId::new(if seq % 2 == 0 { "u2" } else { "u1" }),
            submitted_at: 1000 + seq,
            status: RecordStatus::Pending,
            review: None,
        }
    }

    fn sample_index() -> LedgerIndex {
        LedgerIndex::from_records(vec![
            record(1, "tx_a", 1, "Report-2024.pdf"),
            record(2, "tx_b", 2, "report-final.pdf"),
            record(3, "tx_c", 3, "invoice.pdf"),
        ])
        .unwrap()
    }

    #[test]
    fn test_digest_beats_everything() {
        let index = sample_index();
        let hex = ContentDigest([2; 32]).to_hex();
        let (kind, rec) = resolve(&index, &hex).unwrap();
        assert_eq!(kind, MatchKind::Digest);
        assert_eq!(rec.id, TxId::new("tx_b"));
    }

    #[test]
    fn test_transaction_id_exact() {
        let index = sample_index();
        let (kind, rec) = resolve(&index, "tx_c").unwrap();
        assert_eq!(kind, MatchKind::TransactionId);
        assert_eq!(rec.sequence_number, 3);
    }

    #[test]
    fn test_file_name_substring_prefers_newest() {
        let index = sample_index();
        let (kind, rec) = resolve(&index, "REPORT").unwrap();
        assert_eq!(kind, MatchKind::FileName);
        assert_eq!(rec.id, TxId::new("tx_b"));
    }

    #[test]
    fn test_no_match() {
        let index = sample_index();
        assert!(resolve(&index, "does-not-exist").is_none());
        // A well-formed digest nobody submitted falls through to the other components.
        assert!(resolve(&index, &ContentDigest([0xEE; 32]).to_hex()).is_none());
    }

    #[test]
    fn test_filter_by_status_and_search() {
        let index = sample_index();
        let filter = LedgerFilter::all().with_search("report");
        let hits: Vec<_> = browse(&index, &RecordScope::All, &filter)
            .map(|r| r.sequence_number)
            .collect();
        assert_eq!(hits, vec![2, 1]);

        let filter = LedgerFilter::all().with_status(RecordStatus::Verified);
        assert_eq!(browse(&index, &RecordScope::All, &filter).count(), 0);
    }

    #[test]
    fn test_browse_respects_scope() {
        let index = sample_index();
        let scope = RecordScope::OwnedBy(PrincipalId::new("u1"));
        let filter = LedgerFilter::all();
        let hits: Vec<_> = browse(&index, &scope, &filter)
            .map(|r| r.sequence_number)
            .collect();
        assert_eq!(hits, vec![3, 1]);
    }
}
