//! # Value Objects
//!
//! Immutable configuration and value types for the Document Ledger subsystem.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use shared_types::{Hash, PrincipalId};
use std::fmt;
use std::time::Duration;

/// Length of a rendered digest in hex characters.
pub const DIGEST_HEX_LEN: usize = 64;

/// Prefix of every minted transaction id.
pub const TX_ID_PREFIX: &str = "tx_";

/// Content digest of a document (SHA-256).
///
/// Identical bytes always produce an identical digest. Rendered as 64
/// lowercase hex characters, and serialized that way in human-readable
/// formats; binary formats store the raw 32 bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentDigest(pub Hash);

impl ContentDigest {
    pub fn from_bytes(bytes: Hash) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 64-character hex digest. Upper-case input is accepted.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.len() != DIGEST_HEX_LEN {
            return None;
        }
        let mut out = [0u8; 32];
        hex::decode_to_slice(s, &mut out).ok()?;
        Some(Self(out))
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s)
                .ok_or_else(|| de::Error::custom(format!("invalid content digest: {}", s)))
        } else {
            Hash::deserialize(deserializer).map(Self)
        }
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({}..)", &self.to_hex()[..16])
    }
}

/// Per-submission transaction id. Never derived from the digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxId(pub String);

impl TxId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Monotonic ledger position (the "block number" of a record). Starts at 1.
pub type SequenceNumber = u64;

/// Configuration for the ledger service.
///
/// All values have defaults suitable for a single-node deployment.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Largest accepted payload in bytes (default: 100 MiB).
    pub max_payload_bytes: u64,
    /// Accepted MIME types. Empty accepts everything.
    pub allowed_content_types: Vec<String>,
    /// Maximum title length in characters.
    pub max_title_len: usize,
    /// Maximum description length in characters.
    pub max_description_len: usize,
    /// Maximum review comment length in characters.
    pub max_comment_len: usize,
    /// Bound on acquiring the store lock. Exceeding it is `StoreUnavailable`.
    pub lock_timeout: Duration,
    /// Read size used while streaming a payload through the hasher.
    pub hash_chunk_size: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: 100 * 1024 * 1024, // 100 MiB
            allowed_content_types: vec!["application/pdf".to_string()],
            max_title_len: 256,
            max_description_len: 4096,
            max_comment_len: 2048,
            lock_timeout: Duration::from_secs(5),
            hash_chunk_size: 64 * 1024,
        }
    }
}

impl LedgerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum payload size.
    pub fn with_max_payload_bytes(mut self, bytes: u64) -> Self {
        self.max_payload_bytes = bytes;
        self
    }

    /// Replace the accepted content types. An empty list accepts any type.
    pub fn with_allowed_content_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_content_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Set the lock acquisition bound.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn accepts_content_type(&self, content_type: &str) -> bool {
        self.allowed_content_types.is_empty()
            || self
                .allowed_content_types
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(content_type.trim()))
    }
}

/// Key prefixes for the key-value store.
///
/// All keys are prefixed to namespace different data types.
#[derive(Debug, Clone, Copy)]
pub enum KeyPrefix {
    /// Record data: `r:{tx_id}` -> SealedRecord
    Record,
    /// Digest index: `d:{digest}{sequence}` -> TxId
    ByDigest,
    /// Submitter index: `s:{principal}\0{sequence}` -> TxId
    BySubmitter,
    /// Ledger metadata: `m:seq` -> last assigned sequence number
    Metadata,
}

impl KeyPrefix {
    /// Get the byte prefix for this key type.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            KeyPrefix::Record => b"r:",
            KeyPrefix::ByDigest => b"d:",
            KeyPrefix::BySubmitter => b"s:",
            KeyPrefix::Metadata => b"m:",
        }
    }

    /// Build a full key with the given suffix.
    pub fn key(&self, suffix: &[u8]) -> Vec<u8> {
        let mut key = self.as_bytes().to_vec();
        key.extend_from_slice(suffix);
        key
    }

    pub fn record_key(id: &TxId) -> Vec<u8> {
        KeyPrefix::Record.key(id.as_str().as_bytes())
    }

    /// Digest keys sort by sequence within one digest.
    pub fn digest_key(digest: &ContentDigest, sequence: SequenceNumber) -> Vec<u8> {
        let mut key = KeyPrefix::ByDigest.key(digest.as_bytes());
        key.extend_from_slice(&sequence.to_be_bytes());
        key
    }

    pub fn submitter_key(submitter: &PrincipalId, sequence: SequenceNumber) -> Vec<u8> {
        let mut key = KeyPrefix::BySubmitter.key(submitter.as_str().as_bytes());
        key.push(0);
        key.extend_from_slice(&sequence.to_be_bytes());
        key
    }

    pub fn sequence_key() -> Vec<u8> {
        KeyPrefix::Metadata.key(b"seq")
    }
}
