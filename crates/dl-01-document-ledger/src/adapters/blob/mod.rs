//! Blob Store Adapters
//!
//! Implementations of the `BlobStore` trait.

mod fs;
mod memory;

pub use fs::FsBlobStore;
pub use memory::InMemoryBlobStore;
