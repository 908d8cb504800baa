//! # Domain Layer
//!
//! Pure domain logic for the Document Ledger subsystem.
//! This layer performs no I/O - only types, invariants and decisions.
//!
//! ## Modules
//!
//! - `entities` - DocumentRecord, RecordStatus, ReviewStamp, payload types
//! - `value_objects` - ContentDigest, TxId, KeyPrefix, LedgerConfig
//! - `errors` - Domain and port error types
//! - `index` - In-memory ledger index (id, digest and submitter lookups)
//! - `lifecycle` - Review state machine
//! - `policy` - Role and ownership based access policy
//! - `query` - Verification lookups and ledger filters
//! - `stats` - Status counts

pub mod entities;
pub mod errors;
pub mod index;
pub mod lifecycle;
pub mod policy;
pub mod query;
pub mod stats;
pub mod value_objects;
