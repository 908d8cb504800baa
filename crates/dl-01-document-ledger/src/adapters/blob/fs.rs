use crate::domain::errors::BlobError;
use crate::ports::outbound::BlobStore;
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

/// Blob store over a directory. Handles are relative paths under `root`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a handle to a path, refusing anything that could leave `root`.
    fn resolve(&self, handle: &str) -> Result<PathBuf, BlobError> {
        let invalid = || BlobError::InvalidHandle {
            handle: handle.to_string(),
        };
        if handle.trim().is_empty() {
            return Err(invalid());
        }

        let relative = Path::new(handle);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(invalid());
        }
        Ok(self.root.join(relative))
    }
}

impl BlobStore for FsBlobStore {
    fn open(&self, handle: &str) -> Result<Box<dyn Read + Send + '_>, BlobError> {
        let path = self.resolve(handle)?;
        let file = match std::fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BlobError::NotFound {
                    handle: handle.to_string(),
                })
            }
            Err(e) => return Err(io_error(e)),
        };

        // Directories open fine on Unix and only fail on the first read.
        if !file.metadata().map_err(io_error)?.is_file() {
            return Err(BlobError::InvalidHandle {
                handle: handle.to_string(),
            });
        }
        Ok(Box::new(BufReader::new(file)))
    }
}

fn io_error(e: std::io::Error) -> BlobError {
    BlobError::Io {
        message: e.to_string(),
    }
}
