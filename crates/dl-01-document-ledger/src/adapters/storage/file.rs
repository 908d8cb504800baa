use super::memory::{apply_batch, scan};
use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg(feature = "locking")]
use super::lock::LedgerLock;

/// How long `open` waits for another holder to release the ledger.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// File-backed key-value store.
///
/// The whole map is rewritten on every batch through a temp file and an
/// atomic rename, so the file on disk is always either the previous or the
/// next complete snapshot. With the `locking` feature the store holds an
/// exclusive lock on `<path>.lock` for its whole lifetime, so a second
/// opener (in this process or another) is refused instead of racing.
pub struct FileBackedKVStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    path: PathBuf,
    #[cfg(feature = "locking")]
    _lock: LedgerLock,
}

impl FileBackedKVStore {
    /// Open (or create) a store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        Self::open_with_lock_timeout(path, DEFAULT_LOCK_TIMEOUT)
    }

    /// Open (or create) a store, waiting at most `lock_timeout` for the lock.
    ///
    /// # Errors
    ///
    /// `KVStoreError::Locked` when another holder keeps the ledger past the
    /// timeout, `CorruptionError` for a truncated file, `IOError` otherwise.
    pub fn open_with_lock_timeout<P: AsRef<Path>>(
        path: P,
        lock_timeout: Duration,
    ) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        #[cfg(feature = "locking")]
        let lock = LedgerLock::acquire(&path, lock_timeout)?;
        #[cfg(not(feature = "locking"))]
        let _ = lock_timeout;

        let data = match std::fs::File::open(&path) {
            Ok(mut file) => {
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes).map_err(io_error)?;
                let data = Self::decode(&bytes)?;
                #[cfg(feature = "tracing-log")]
                tracing::info!(
                    "[dl-01] 💾 Loaded {} keys from {} ({} bytes)",
                    data.len(),
                    path.display(),
                    bytes.len()
                );
                data
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                #[cfg(feature = "tracing-log")]
                tracing::info!("[dl-01] 📁 No existing ledger file at {}", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(io_error(e)),
        };

        Ok(Self {
            data,
            path,
            #[cfg(feature = "locking")]
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Format: [key_len:u32 LE][key][value_len:u32 LE][value]...
    fn decode(bytes: &[u8]) -> Result<BTreeMap<Vec<u8>, Vec<u8>>, KVStoreError> {
        let mut data = BTreeMap::new();
        let mut cursor = 0;

        let take = |cursor: &mut usize, len: usize| -> Result<Vec<u8>, KVStoreError> {
            let end = cursor
                .checked_add(len)
                .filter(|&end| end <= bytes.len())
                .ok_or_else(|| KVStoreError::CorruptionError {
                    message: format!("truncated ledger file at offset {}", cursor),
                })?;
            let out = bytes[*cursor..end].to_vec();
            *cursor = end;
            Ok(out)
        };

        while cursor < bytes.len() {
            let key_len = read_len(&take(&mut cursor, 4)?);
            let key = take(&mut cursor, key_len)?;
            let value_len = read_len(&take(&mut cursor, 4)?);
            let value = take(&mut cursor, value_len)?;
            data.insert(key, value);
        }

        Ok(data)
    }

    fn encode(data: &BTreeMap<Vec<u8>, Vec<u8>>) -> Vec<u8> {
        let mut bytes = Vec::new();
        for (key, value) in data {
            bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
            bytes.extend_from_slice(key);
            bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
            bytes.extend_from_slice(value);
        }
        bytes
    }

    fn save(&self, data: &BTreeMap<Vec<u8>, Vec<u8>>) -> Result<(), KVStoreError> {
        let bytes = Self::encode(data);

        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(io_error)?;
        file.write_all(&bytes).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;
        std::fs::rename(&temp_path, &self.path).map_err(io_error)?;
        sync_parent_dir(&self.path)?;

        Ok(())
    }
}

fn read_len(bytes: &[u8]) -> usize {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf) as usize
}

/// Persist the rename itself by syncing the directory entry.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<(), KVStoreError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::File::open(parent)
        .and_then(|dir| dir.sync_all())
        .map_err(io_error)
}

// No directory handles to sync on Windows.
#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<(), KVStoreError> {
    Ok(())
}

fn io_error(e: std::io::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: e.to_string(),
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        // Stage on a copy: memory only changes once the file is durable.
        let mut next = self.data.clone();
        apply_batch(&mut next, operations);
        self.save(&next)?;
        self.data = next;
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan(&self.data, prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");

        {
            let mut store = FileBackedKVStore::open(&path).unwrap();
            store
                .atomic_batch_write(vec![
                    BatchOperation::put(b"r:1".to_vec(), b"one".to_vec()),
                    BatchOperation::put(b"m:seq".to_vec(), 1u64.to_be_bytes().to_vec()),
                ])
                .unwrap();
        }

        let store = FileBackedKVStore::open(&path).unwrap();
        assert_eq!(store.get(b"r:1").unwrap(), Some(b"one".to_vec()));
        assert_eq!(store.prefix_scan(b"m:").unwrap().len(), 1);
    }

    #[test]
    fn test_truncated_file_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        std::fs::write(&path, [5u8, 0, 0, 0, b'a']).unwrap();

        let result = FileBackedKVStore::open(&path);
        assert!(matches!(result, Err(KVStoreError::CorruptionError { .. })));
    }

    #[test]
    fn test_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/data/ledger.db");

        let mut store = FileBackedKVStore::open(&path).unwrap();
        store
            .atomic_batch_write(vec![BatchOperation::put(b"r:1".to_vec(), b"one".to_vec())])
            .unwrap();

        assert!(path.is_file());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_failed_save_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        let mut store = FileBackedKVStore::open(&path).unwrap();

        // A non-empty directory where the file should be makes the rename fail.
        std::fs::create_dir_all(path.join("blocker")).unwrap();
        let result = store.atomic_batch_write(vec![BatchOperation::put(
            b"r:1".to_vec(),
            b"one".to_vec(),
        )]);

        assert!(matches!(result, Err(KVStoreError::IOError { .. })));
        assert_eq!(store.get(b"r:1").unwrap(), None);
    }

    #[cfg(feature = "locking")]
    #[test]
    fn test_second_open_is_refused_while_held() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");

        let first = FileBackedKVStore::open(&path).unwrap();
        let second = FileBackedKVStore::open_with_lock_timeout(&path, Duration::from_millis(20));
        assert!(matches!(second, Err(KVStoreError::Locked { .. })));

        drop(first);
        assert!(FileBackedKVStore::open_with_lock_timeout(&path, Duration::ZERO).is_ok());
    }
}
