//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the Document Ledger service.
//!
//! These are the interfaces the host application implements (or picks from
//! `adapters/`).

use crate::domain::entities::DocumentRecord;
use crate::domain::errors::{BlobError, CodecError, HashingError, KVStoreError};
use crate::domain::value_objects::{ContentDigest, TxId};
use shared_types::Timestamp;
use std::io::Read;

/// Result type for prefix scans.
pub type ScanResult = Vec<(Vec<u8>, Vec<u8>)>;

/// Abstract interface for key-value database operations.
///
/// Production: `FileBackedKVStore`
/// Testing: `InMemoryKVStore`
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch succeed, or NONE are applied.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError>;

    /// Iterate over keys with a prefix.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Blob-store collaborator. The ledger never stores file content itself;
/// it only reads bytes once, at submit time, to hash them.
pub trait BlobStore: Send + Sync {
    /// Open a blob for streaming reads.
    fn open(&self, handle: &str) -> Result<Box<dyn Read + Send + '_>, BlobError>;

    /// Read a whole blob into memory.
    fn read_bytes(&self, handle: &str) -> Result<Vec<u8>, BlobError> {
        let mut reader = self.open(handle)?;
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(|e| BlobError::Io {
            message: e.to_string(),
        })?;
        Ok(bytes)
    }
}

/// Output of hashing a payload stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashedPayload {
    pub digest: ContentDigest,
    pub size_bytes: u64,
}

/// Deterministic content hasher.
pub trait ContentHasher: Send + Sync {
    /// Digest of an in-memory payload. Never fails.
    fn digest(&self, bytes: &[u8]) -> ContentDigest;

    /// Digest of a stream, read in bounded chunks. Fails only on read errors.
    fn digest_reader(&self, reader: &mut dyn Read) -> Result<HashedPayload, HashingError>;
}

/// Mints transaction ids.
pub trait TxIdGenerator: Send + Sync {
    fn new_id(&self) -> TxId;
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Get current timestamp in seconds since epoch.
    fn now(&self) -> Timestamp;
}

/// Encodes records for persistence with an integrity checksum.
pub trait RecordCodec: Send + Sync {
    /// Seal and encode a record.
    fn encode(&self, record: &DocumentRecord) -> Result<Vec<u8>, CodecError>;

    /// Decode and verify a sealed record.
    fn decode(&self, data: &[u8]) -> Result<DocumentRecord, CodecError>;
}
