//! Infrastructure Adapters
//!
//! Implementations of infrastructure traits (time, hashing, id minting).

mod hasher;
mod time;
mod txid;

pub use hasher::Sha256ContentHasher;
pub use time::{FixedTimeSource, SystemTimeSource};
pub use txid::{RandomTxIdGenerator, TX_ID_ENTROPY_BYTES};
