//! # Adapters Module
//!
//! Concrete implementations of the outbound ports.
//!
//! ## Modules
//!
//! - `storage`: key-value stores (in-memory, file-backed)
//! - `blob`: document byte sources (in-memory, directory)
//! - `infra`: time, hashing and transaction id minting
//! - `serializer`: sealed record encoding

pub mod blob;
pub mod infra;
pub mod serializer;
pub mod storage;

pub use blob::{FsBlobStore, InMemoryBlobStore};
pub use infra::{FixedTimeSource, RandomTxIdGenerator, Sha256ContentHasher, SystemTimeSource};
pub use serializer::BincodeRecordCodec;
pub use storage::{FileBackedKVStore, InMemoryKVStore};
