//! # Ledger File Lock
//!
//! One writer per ledger file. The snapshot store loads the whole file and
//! rewrites it on every batch, so two openers on the same path would hand out
//! the same sequence numbers and the last writer would drop the other's
//! records.
//!
//! Uses `fs2` (flock on Unix, LockFile on Windows). The OS releases the lock
//! when the holder exits, so a crashed process never leaves a stale lock.

use crate::domain::errors::KVStoreError;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Upper bound between two acquisition attempts.
const MAX_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Exclusive lock on `<ledger file>.lock`, held until drop.
#[derive(Debug)]
pub struct LedgerLock {
    file: File,
    path: PathBuf,
}

impl LedgerLock {
    /// Lock path for a ledger file.
    pub fn path_for(ledger_path: &Path) -> PathBuf {
        let mut name = ledger_path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Acquire the lock, retrying with exponential backoff until `timeout`.
    ///
    /// # Errors
    ///
    /// `KVStoreError::Locked` if another holder keeps the lock past the
    /// deadline; `KVStoreError::IOError` if the lock file cannot be opened.
    pub fn acquire(ledger_path: &Path, timeout: Duration) -> Result<Self, KVStoreError> {
        let path = Self::path_for(ledger_path);
        let deadline = Instant::now() + timeout;
        let mut retry_delay = Duration::from_millis(10);

        // Never truncate here: the holder's pid lives in this file.
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| KVStoreError::IOError {
                message: format!("cannot open lock file {}: {}", path.display(), e),
            })?;

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    write_pid(&mut file).map_err(|e| KVStoreError::IOError {
                        message: format!("cannot write lock file {}: {}", path.display(), e),
                    })?;
                    #[cfg(feature = "tracing-log")]
                    tracing::debug!("[dl-01] 🔒 Acquired ledger lock {}", path.display());
                    return Ok(Self { file, path });
                }
                Err(_) if Instant::now() < deadline => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    std::thread::sleep(retry_delay.min(remaining));
                    retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
                }
                Err(_) => {
                    let holder = read_pid(&mut file);
                    #[cfg(feature = "tracing-log")]
                    tracing::warn!(
                        "[dl-01] 🔒 Ledger {} is locked by {:?}",
                        ledger_path.display(),
                        holder
                    );
                    return Err(KVStoreError::Locked { path, holder });
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        // The lock file is never unlinked: waiters hold handles to it.
        let _ = FileExt::unlock(&self.file);
    }
}

fn write_pid(file: &mut File) -> std::io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(file, "{}", std::process::id())?;
    file.sync_all()
}

fn read_pid(file: &mut File) -> Option<u32> {
    let mut contents = String::new();
    file.seek(SeekFrom::Start(0)).ok()?;
    file.read_to_string(&mut contents).ok()?;
    contents.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = dir.path().join("ledger.db");

        let held = LedgerLock::acquire(&ledger, Duration::from_millis(50)).unwrap();
        assert_eq!(held.path(), dir.path().join("ledger.db.lock"));

        let started = Instant::now();
        let result = LedgerLock::acquire(&ledger, Duration::from_millis(100));
        match result {
            Err(KVStoreError::Locked { holder, .. }) => {
                assert_eq!(holder, Some(std::process::id()));
            }
            other => panic!("expected Locked, got {:?}", other),
        }
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn test_lock_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = dir.path().join("ledger.db");

        drop(LedgerLock::acquire(&ledger, Duration::ZERO).unwrap());
        assert!(LedgerLock::acquire(&ledger, Duration::ZERO).is_ok());
    }

    #[test]
    fn test_waiter_gets_lock_once_released() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = dir.path().join("ledger.db");

        let held = LedgerLock::acquire(&ledger, Duration::ZERO).unwrap();
        let releaser = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            drop(held);
        });

        assert!(LedgerLock::acquire(&ledger, Duration::from_secs(5)).is_ok());
        releaser.join().unwrap();
    }
}
