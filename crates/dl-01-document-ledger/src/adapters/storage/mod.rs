//! Storage Adapters
//!
//! Implementations of the `KeyValueStore` trait.

mod file;
#[cfg(feature = "locking")]
mod lock;
mod memory;

pub use file::{FileBackedKVStore, DEFAULT_LOCK_TIMEOUT};
#[cfg(feature = "locking")]
pub use lock::LedgerLock;
pub use memory::InMemoryKVStore;
