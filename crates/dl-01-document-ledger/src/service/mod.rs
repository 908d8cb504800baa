//! # Document Ledger Service
//!
//! The application service behind both inbound ports.
//!
//! ## Architecture
//!
//! This service:
//! 1. Implements `LedgerStore` (sequenced record store, trusted callers)
//! 2. Implements `DocumentLedgerApi` (principal-facing boundary)
//! 3. Serializes `append` and `update_status` behind one write lock
//! 4. Uses dependency injection for all external dependencies
//!
//! Hashing and id minting run outside the lock; only the short
//! check-then-write section of a mutation holds it.

mod api;
mod helpers;
mod storage;

use crate::adapters::{
    BincodeRecordCodec, FileBackedKVStore, FsBlobStore, InMemoryBlobStore, InMemoryKVStore,
    RandomTxIdGenerator, Sha256ContentHasher, SystemTimeSource,
};
use crate::domain::errors::LedgerResult;
use crate::domain::index::LedgerIndex;
use crate::domain::policy::AccessPolicy;
use crate::domain::value_objects::LedgerConfig;
use crate::ports::outbound::{
    BlobStore, ContentHasher, KeyValueStore, RecordCodec, TimeSource, TxIdGenerator,
};
use parking_lot::RwLock;

/// State guarded by the ledger lock: the durable store and its in-memory view.
pub(crate) struct LedgerState<KV> {
    pub(crate) kv_store: KV,
    pub(crate) index: LedgerIndex,
}

/// The Document Ledger Service.
pub struct DocumentLedgerService<KV, BL, HS, IG, TS, RC>
where
    KV: KeyValueStore,
    BL: BlobStore,
    HS: ContentHasher,
    IG: TxIdGenerator,
    TS: TimeSource,
    RC: RecordCodec,
{
    /// Store plus index, one mutual-exclusion domain.
    pub(crate) state: RwLock<LedgerState<KV>>,
    /// Source of payload bytes for `DocumentPayload::Blob`.
    pub(crate) blobs: BL,
    pub(crate) hasher: HS,
    pub(crate) id_generator: IG,
    pub(crate) time_source: TS,
    /// Sealed record encoding for persistence.
    pub(crate) codec: RC,
    pub(crate) config: LedgerConfig,
    pub(crate) policy: AccessPolicy,
}

/// Dependencies for DocumentLedgerService
pub struct LedgerDependencies<KV, BL, HS, IG, TS, RC> {
    pub kv_store: KV,
    pub blobs: BL,
    pub hasher: HS,
    pub id_generator: IG,
    pub time_source: TS,
    pub codec: RC,
}

/// Service wired to in-memory adapters.
pub type InMemoryLedgerService = DocumentLedgerService<
    InMemoryKVStore,
    InMemoryBlobStore,
    Sha256ContentHasher,
    RandomTxIdGenerator,
    SystemTimeSource,
    BincodeRecordCodec,
>;

/// Service wired to the file-backed store and a blob directory.
pub type FileLedgerService = DocumentLedgerService<
    FileBackedKVStore,
    FsBlobStore,
    Sha256ContentHasher,
    RandomTxIdGenerator,
    SystemTimeSource,
    BincodeRecordCodec,
>;

impl<KV, BL>
    LedgerDependencies<
        KV,
        BL,
        Sha256ContentHasher,
        RandomTxIdGenerator,
        SystemTimeSource,
        BincodeRecordCodec,
    >
{
    /// Production hashing, id minting, clock and codec over the given stores.
    pub fn standard(kv_store: KV, blobs: BL, config: &LedgerConfig) -> Self {
        Self {
            kv_store,
            blobs,
            hasher: Sha256ContentHasher::new(config.hash_chunk_size),
            id_generator: RandomTxIdGenerator,
            time_source: SystemTimeSource,
            codec: BincodeRecordCodec,
        }
    }
}

impl<KV, BL, HS, IG, TS, RC> DocumentLedgerService<KV, BL, HS, IG, TS, RC>
where
    KV: KeyValueStore,
    BL: BlobStore,
    HS: ContentHasher,
    IG: TxIdGenerator,
    TS: TimeSource,
    RC: RecordCodec,
{
    /// Create a service over the given dependencies.
    ///
    /// The in-memory index is rebuilt from the store. Opening fails if any
    /// persisted record fails its checksum, if sequence numbers are not
    /// exactly `1..=n`, or if the persisted counter disagrees with `n`.
    pub fn new(
        deps: LedgerDependencies<KV, BL, HS, IG, TS, RC>,
        config: LedgerConfig,
    ) -> LedgerResult<Self> {
        let index = helpers::load_index(&deps.kv_store, &deps.codec)?;

        Ok(Self {
            state: RwLock::new(LedgerState {
                kv_store: deps.kv_store,
                index,
            }),
            blobs: deps.blobs,
            hasher: deps.hasher,
            id_generator: deps.id_generator,
            time_source: deps.time_source,
            codec: deps.codec,
            config,
            policy: AccessPolicy::new(),
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// The blob-store collaborator this service reads payloads from.
    pub fn blobs(&self) -> &BL {
        &self.blobs
    }
}

impl InMemoryLedgerService {
    /// Empty ledger over in-memory adapters.
    pub fn new_in_memory(config: LedgerConfig) -> LedgerResult<Self> {
        let deps = LedgerDependencies::standard(
            InMemoryKVStore::new(),
            InMemoryBlobStore::new(),
            &config,
        );
        Self::new(deps, config)
    }
}

impl FileLedgerService {
    /// Open (or create) a ledger file and read payloads from `blob_root`.
    ///
    /// Waits up to `config.lock_timeout` for another holder of the same file;
    /// past that the open fails with a retryable `StoreUnavailable`.
    pub fn open(
        ledger_path: impl AsRef<std::path::Path>,
        blob_root: impl Into<std::path::PathBuf>,
        config: LedgerConfig,
    ) -> LedgerResult<Self> {
        let kv_store =
            FileBackedKVStore::open_with_lock_timeout(ledger_path, config.lock_timeout)?;
        let deps = LedgerDependencies::standard(kv_store, FsBlobStore::new(blob_root), &config);
        Self::new(deps, config)
    }
}
