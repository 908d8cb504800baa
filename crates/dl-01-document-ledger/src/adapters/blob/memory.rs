use crate::domain::errors::BlobError;
use crate::ports::outbound::BlobStore;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::{Cursor, Read};

/// In-memory blob store for testing.
#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, handle: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.blobs.write().insert(handle.into(), bytes.into());
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn open(&self, handle: &str) -> Result<Box<dyn Read + Send + '_>, BlobError> {
        // Snapshot the bytes so the lock is not held while the caller hashes.
        let bytes = self
            .blobs
            .read()
            .get(handle)
            .cloned()
            .ok_or_else(|| BlobError::NotFound {
                handle: handle.to_string(),
            })?;
        Ok(Box::new(Cursor::new(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_known_and_unknown() {
        let store = InMemoryBlobStore::new();
        store.insert("uploads/a.pdf", b"%PDF-1.7".to_vec());

        assert_eq!(store.read_bytes("uploads/a.pdf").unwrap(), b"%PDF-1.7");
        assert!(matches!(
            store.open("uploads/missing.pdf"),
            Err(BlobError::NotFound { .. })
        ));
    }
}
