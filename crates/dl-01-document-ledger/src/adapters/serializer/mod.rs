//! Serializer Adapters
//!
//! Implementations of the `RecordCodec` trait.

mod bincode;

pub use self::bincode::BincodeRecordCodec;
