use crate::domain::errors::HashingError;
use crate::domain::value_objects::ContentDigest;
use crate::ports::outbound::{ContentHasher, HashedPayload};
use sha2::{Digest, Sha256};
use std::io::{ErrorKind, Read};

/// SHA-256 content hasher.
///
/// Streams are consumed in `chunk_size` reads so large payloads never sit in
/// memory whole.
#[derive(Debug, Clone, Copy)]
pub struct Sha256ContentHasher {
    chunk_size: usize,
}

impl Sha256ContentHasher {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }
}

impl Default for Sha256ContentHasher {
    fn default() -> Self {
        Self::new(64 * 1024)
    }
}

impl ContentHasher for Sha256ContentHasher {
    fn digest(&self, bytes: &[u8]) -> ContentDigest {
        ContentDigest(Sha256::digest(bytes).into())
    }

    fn digest_reader(&self, reader: &mut dyn Read) -> Result<HashedPayload, HashingError> {
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; self.chunk_size];
        let mut bytes_read = 0u64;

        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    hasher.update(&buf[..n]);
                    bytes_read += n as u64;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(HashingError {
                        bytes_read,
                        message: e.to_string(),
                    })
                }
            }
        }

        Ok(HashedPayload {
            digest: ContentDigest(hasher.finalize().into()),
            size_bytes: bytes_read,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_known_vector() {
        let digest = Sha256ContentHasher::default().digest(b"Hello");
        assert_eq!(
            digest.to_hex(),
            "185f8db32271fe25f561a6fc938b2e264306ec304eda518007d1764826381969"
        );
    }

    #[test]
    fn test_empty_input_has_defined_digest() {
        let digest = Sha256ContentHasher::default().digest(b"");
        assert_eq!(
            digest.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_stream_matches_in_memory() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let hasher = Sha256ContentHasher::new(7);
        let hashed = hasher.digest_reader(&mut Cursor::new(&data)).unwrap();
        assert_eq!(hashed.digest, hasher.digest(&data));
        assert_eq!(hashed.size_bytes, data.len() as u64);
    }

    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.served {
                return Err(std::io::Error::new(ErrorKind::BrokenPipe, "connection reset"));
            }
            self.served = true;
            buf[..4].copy_from_slice(b"%PDF");
            Ok(4)
        }
    }

    #[test]
    fn test_read_failure_reports_progress() {
        let err = Sha256ContentHasher::new(16)
            .digest_reader(&mut FailingReader { served: false })
            .unwrap_err();
        assert_eq!(err.bytes_read, 4);
        assert!(err.message.contains("connection reset"));
    }
}
