//! # Ledger Entities
//!
//! Core entities of the Document Ledger subsystem.
//!
//! A `DocumentRecord` has an immutable core (id, digest, sequence number,
//! submission metadata) and one mutable review slot. The review slot is
//! `Some` iff the status is not `Pending`, which makes the "review fields
//! populated iff reviewed" invariant hold by construction.

use crate::domain::value_objects::{ContentDigest, SequenceNumber, TxId};
use serde::{Deserialize, Serialize};
use shared_types::{PrincipalId, Timestamp};
use std::fmt;

/// Review state of a record.
///
/// ```text
/// Pending ──review(Verified)──→ Verified   (terminal)
///    │
///    └─────review(Rejected)──→ Rejected   (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Pending,
    Verified,
    Rejected,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Verified => "verified",
            RecordStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RecordStatus::Pending)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(RecordStatus::Pending),
            "verified" => Ok(RecordStatus::Verified),
            "rejected" => Ok(RecordStatus::Rejected),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// Outcome a reviewer may assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewOutcome {
    Verified,
    Rejected,
}

impl ReviewOutcome {
    pub fn status(&self) -> RecordStatus {
        match self {
            ReviewOutcome::Verified => RecordStatus::Verified,
            ReviewOutcome::Rejected => RecordStatus::Rejected,
        }
    }
}

impl std::str::FromStr for ReviewOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verified" | "verify" | "approve" => Ok(ReviewOutcome::Verified),
            "rejected" | "reject" => Ok(ReviewOutcome::Rejected),
            other => Err(format!("unknown review outcome: {}", other)),
        }
    }
}

/// Review fields, written once on the transition out of `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStamp {
    /// Reviewer principal (always holds reviewer capability).
    pub reviewer_id: PrincipalId,
    /// Institution the reviewer acted for.
    pub reviewer_institute: Option<String>,
    /// When the review was recorded.
    pub reviewed_at: Timestamp,
    /// Free-form comment; may be empty.
    pub comment: String,
}

/// Submission metadata supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SubmissionMetadata {
    pub file_name: String,
    pub content_type: String,
    /// Defaults to the file name when blank.
    pub title: String,
    pub description: String,
}

impl SubmissionMetadata {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Document bytes handed to `submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentPayload {
    /// Bytes already in memory.
    Inline(Vec<u8>),
    /// Handle into the blob-store collaborator; streamed through the hasher.
    Blob(String),
}

/// A ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Transaction id, unique for the lifetime of the store.
    pub id: TxId,
    /// Content digest of the file bytes.
    pub digest: ContentDigest,
    /// Ledger position, strictly increasing and gap-free.
    pub sequence_number: SequenceNumber,
    pub file_name: String,
    pub file_size_bytes: u64,
    pub content_type: String,
    pub title: String,
    pub description: String,
    /// Owning principal.
    pub submitter_id: PrincipalId,
    pub submitted_at: Timestamp,
    /// Mutable only through the lifecycle state machine.
    pub status: RecordStatus,
    /// Present iff `status != Pending`.
    pub review: Option<ReviewStamp>,
}

impl DocumentRecord {
    pub fn reviewer_id(&self) -> Option<&PrincipalId> {
        self.review.as_ref().map(|r| &r.reviewer_id)
    }

    pub fn reviewed_at(&self) -> Option<Timestamp> {
        self.review.as_ref().map(|r| r.reviewed_at)
    }

    pub fn review_comment(&self) -> Option<&str> {
        self.review.as_ref().map(|r| r.comment.as_str())
    }

    pub fn is_pending(&self) -> bool {
        self.status == RecordStatus::Pending
    }

    pub fn is_owned_by(&self, principal: &PrincipalId) -> bool {
        &self.submitter_id == principal
    }

    /// Review fields are populated iff the record left `Pending`.
    pub fn review_fields_consistent(&self) -> bool {
        self.review.is_some() == self.status.is_terminal()
    }
}

/// Persisted envelope: the record plus a CRC32 over its encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedRecord {
    pub record: DocumentRecord,
    pub checksum: u32,
}
