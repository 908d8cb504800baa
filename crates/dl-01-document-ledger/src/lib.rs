//! # Document Ledger (dl-01)
//!
//! A content-addressed document integrity ledger. A principal submits a
//! document; the ledger hashes it, mints a transaction id and appends a
//! sequenced `Pending` record. Anyone can later verify a document by digest,
//! transaction id or file name, and an institute reviewer moves pending
//! records to `Verified` or `Rejected`.
//!
//! ## Data Flow
//!
//! ```text
//! submit(payload, metadata, principal)
//!        │
//!        ├──→ Access Policy ──→ Hasher ──→ TxId Generator
//!        │                                      │
//!        ↓                                      ↓
//! Ledger Store ←── append (next sequence, one atomic batch)
//!        ↑
//! review(id, outcome) ──→ Lifecycle (Pending → Verified | Rejected)
//! verify(query)       ──→ digest > tx id > file name fragment
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Stable digest | Identical bytes always give the identical SHA-256 digest |
//! | Unique ids | A transaction id is never reused; collisions fail closed |
//! | Gap-free sequence | Sequence numbers are `1..=n` with no gaps or repeats |
//! | Terminal review | A record leaves `Pending` at most once |
//! | Review fields | Reviewer, time and comment are present iff reviewed |
//! | No self-review | A reviewer never reviews their own submission |
//! | Atomic writes | A failed append or review leaves no partial state |
//! | Data integrity | Every persisted record carries a CRC32 verified on load |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Pure domain logic (entities, lifecycle, policy, queries, index)
//! - `ports/` - Port traits (inbound API, outbound SPI)
//! - `adapters/` - Stores, blob sources, hashing, ids, time, codec
//! - `service/` - Application service implementing both inbound ports
//!
//! ## Usage
//!
//! ```ignore
//! use dl_01_document_ledger::{
//!     DocumentLedgerApi, DocumentPayload, InMemoryLedgerService, LedgerConfig,
//!     ReviewOutcome, SubmissionMetadata,
//! };
//! use shared_types::Principal;
//!
//! let ledger = InMemoryLedgerService::new_in_memory(LedgerConfig::default())?;
//!
//! let alice = Principal::user("alice", "Alice");
//! let record = ledger.submit(
//!     DocumentPayload::Inline(pdf_bytes),
//!     SubmissionMetadata::new("diploma.pdf", "application/pdf"),
//!     &alice,
//! )?;
//!
//! let registrar = Principal::institute("reg-1", "Registrar", "State University");
//! ledger.review(&record.id, ReviewOutcome::Verified, "matches archive", &registrar)?;
//!
//! assert!(ledger.verify(&record.digest.to_hex())?.is_authentic());
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export key types for convenience
pub use domain::entities::{
    DocumentPayload, DocumentRecord, RecordStatus, ReviewOutcome, ReviewStamp,
    SubmissionMetadata,
};
pub use domain::errors::{LedgerError, LedgerResult};
pub use domain::policy::{AccessPolicy, RecordScope};
pub use domain::query::{LedgerFilter, MatchKind, VerificationResult};
pub use domain::stats::LedgerStats;
pub use domain::value_objects::{ContentDigest, LedgerConfig, SequenceNumber, TxId};
pub use ports::inbound::{DocumentLedgerApi, LedgerStore};
pub use ports::outbound::{
    BlobStore, ContentHasher, KeyValueStore, RecordCodec, TimeSource, TxIdGenerator,
};
pub use service::{
    DocumentLedgerService, FileLedgerService, InMemoryLedgerService, LedgerDependencies,
};
