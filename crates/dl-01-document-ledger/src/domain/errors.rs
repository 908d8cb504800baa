//! # Domain Errors
//!
//! Error types for the Document Ledger subsystem.
//!
//! ## Taxonomy
//!
//! | Variant | Class | Retry |
//! |---------|-------|-------|
//! | `Validation` | rejected before any mutation | no |
//! | `NotFound` | surfaced | no |
//! | `Forbidden` | surfaced, leaks nothing about existence | no |
//! | `AlreadyReviewed` | conflict, caller should re-fetch | no |
//! | `DuplicateId` | invariant violation, fails closed | no |
//! | `HashingFailed` | transient | yes |
//! | `StoreUnavailable` | transient | yes |
//! | `DataCorruption` | persisted state failed its checksum | no |
//! | `Serialization` | codec failure | no |
//! | `Inconsistent` | persisted state failed its structural checks | no |

use crate::domain::entities::RecordStatus;
use crate::domain::value_objects::TxId;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Missing or malformed submission input.
    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    /// No record under this transaction id or digest.
    #[error("Record not found: {key}")]
    NotFound { key: String },

    /// Caller is not allowed to perform this operation.
    #[error("Forbidden: {reason}")]
    Forbidden { reason: &'static str },

    /// Record already left `Pending`; terminal states never transition.
    #[error("Record {id} already reviewed (status: {status})")]
    AlreadyReviewed { id: TxId, status: RecordStatus },

    /// Transaction id collided with an existing record.
    #[error("Duplicate transaction id: {id}")]
    DuplicateId { id: TxId },

    /// Payload could not be read while hashing.
    #[error("Hashing failed: {message}")]
    HashingFailed { message: String },

    /// Store could not be reached or locked in bounded time.
    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// Persisted record failed its integrity check.
    #[error("Data corruption in record {key}: expected checksum {expected}, got {actual}")]
    DataCorruption {
        key: String,
        expected: u32,
        actual: u32,
    },

    /// Encoding/decoding of persisted state failed.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Persisted records, indexes and counter disagree.
    #[error("Ledger state inconsistent: {message}")]
    Inconsistent { message: String },
}

impl LedgerError {
    pub fn validation(reason: impl Into<String>) -> Self {
        LedgerError::Validation {
            reason: reason.into(),
        }
    }

    pub fn not_found(key: impl fmt::Display) -> Self {
        LedgerError::NotFound {
            key: key.to_string(),
        }
    }

    /// Transient failures; a retried call either had no effect or its full effect.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::HashingFailed { .. } | LedgerError::StoreUnavailable { .. }
        )
    }

    /// Stable tag for presentation layers.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::Validation { .. } => "validation_error",
            LedgerError::NotFound { .. } => "not_found",
            LedgerError::Forbidden { .. } => "forbidden",
            LedgerError::AlreadyReviewed { .. } => "already_reviewed",
            LedgerError::DuplicateId { .. } => "duplicate_id",
            LedgerError::HashingFailed { .. } => "hashing_failed",
            LedgerError::StoreUnavailable { .. } => "store_unavailable",
            LedgerError::DataCorruption { .. } => "data_corruption",
            LedgerError::Serialization { .. } => "serialization_error",
            LedgerError::Inconsistent { .. } => "inconsistent_state",
        }
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Key-value store errors.
#[derive(Debug, Clone)]
pub enum KVStoreError {
    /// I/O error during read/write.
    IOError { message: String },
    /// Data corruption in the store.
    CorruptionError { message: String },
    /// Another holder owns the store's lock file.
    Locked {
        path: std::path::PathBuf,
        holder: Option<u32>,
    },
}

impl fmt::Display for KVStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KVStoreError::IOError { message } => write!(f, "KV store I/O error: {}", message),
            KVStoreError::CorruptionError { message } => {
                write!(f, "KV store corruption: {}", message)
            }
            KVStoreError::Locked {
                path,
                holder: Some(pid),
            } => write!(f, "KV store locked by process {} ({})", pid, path.display()),
            KVStoreError::Locked { path, holder: None } => {
                write!(f, "KV store locked ({})", path.display())
            }
        }
    }
}

impl std::error::Error for KVStoreError {}

impl From<KVStoreError> for LedgerError {
    fn from(err: KVStoreError) -> Self {
        match err {
            KVStoreError::IOError { .. } | KVStoreError::Locked { .. } => {
                LedgerError::StoreUnavailable {
                    message: err.to_string(),
                }
            }
            KVStoreError::CorruptionError { message } => LedgerError::Serialization { message },
        }
    }
}

/// Blob-store collaborator errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlobError {
    /// No blob behind this handle.
    #[error("Blob not found: {handle}")]
    NotFound { handle: String },
    /// Handle escapes the blob root or is otherwise malformed.
    #[error("Invalid blob handle: {handle}")]
    InvalidHandle { handle: String },
    /// Underlying read failed.
    #[error("Blob I/O error: {message}")]
    Io { message: String },
}

impl From<BlobError> for LedgerError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::NotFound { .. } | BlobError::InvalidHandle { .. } => {
                LedgerError::validation(err.to_string())
            }
            BlobError::Io { message } => LedgerError::HashingFailed { message },
        }
    }
}

/// Hashing errors. Only raised on read failure, never on content shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Payload read failed after {bytes_read} bytes: {message}")]
pub struct HashingError {
    pub bytes_read: u64,
    pub message: String,
}

impl From<HashingError> for LedgerError {
    fn from(err: HashingError) -> Self {
        LedgerError::HashingFailed {
            message: err.to_string(),
        }
    }
}

/// Record codec errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Record could not be encoded.
    #[error("Encode failed: {message}")]
    Encode { message: String },
    /// Bytes are not a sealed record.
    #[error("Decode failed: {message}")]
    Decode { message: String },
    /// Sealed bytes decoded but the checksum does not match the content.
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: u32, actual: u32 },
}

impl CodecError {
    /// Attach the storage key the failing bytes were read from.
    pub fn at_key(self, key: &[u8]) -> LedgerError {
        match self {
            CodecError::ChecksumMismatch { expected, actual } => LedgerError::DataCorruption {
                key: String::from_utf8_lossy(key).into_owned(),
                expected,
                actual,
            },
            other => other.into(),
        }
    }
}

impl From<CodecError> for LedgerError {
    fn from(err: CodecError) -> Self {
        LedgerError::Serialization {
            message: err.to_string(),
        }
    }
}
