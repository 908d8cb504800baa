//! # Ledger Invariant Tests (dl-01)
//!
//! Exercises the public API end to end.
//!
//! ## Test Categories
//!
//! 1. **Concurrency** - parallel submitters never share or skip a sequence number
//! 2. **Persistence** - a file-backed ledger survives reopen, detects tampering
//!    and admits one opener at a time
//! 3. **Properties** - digest stability, sequence monotonicity, ownership scoping

use dl_01_document_ledger::adapters::{FileBackedKVStore, Sha256ContentHasher};
use dl_01_document_ledger::{
    ContentHasher, DocumentLedgerApi, DocumentPayload, FileLedgerService, InMemoryLedgerService,
    LedgerConfig, LedgerError, LedgerStore, RecordStatus, ReviewOutcome, SubmissionMetadata,
};
use proptest::prelude::*;
use shared_types::{Principal, PrincipalId};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

// =============================================================================
// TEST HELPERS
// =============================================================================

fn pdf(name: &str) -> SubmissionMetadata {
    SubmissionMetadata::new(name, "application/pdf")
}

fn user(n: usize) -> Principal {
    Principal::user(format!("user-{}", n), format!("User {}", n))
}

fn registrar() -> Principal {
    Principal::institute("reg-1", "Registrar", "State University")
}

fn in_memory() -> InMemoryLedgerService {
    InMemoryLedgerService::new_in_memory(LedgerConfig::default()).unwrap()
}

// =============================================================================
// CONCURRENCY
// =============================================================================

#[test]
fn test_parallel_appends_get_unique_gap_free_sequences() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 25;

    let ledger = Arc::new(in_memory());
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                let principal = user(t);
                (0..PER_THREAD)
                    .map(|i| {
                        let bytes = format!("thread {} document {}", t, i).into_bytes();
                        ledger
                            .submit(
                                DocumentPayload::Inline(bytes),
                                pdf(&format!("t{}-{}.pdf", t, i)),
                                &principal,
                            )
                            .unwrap()
                            .sequence_number
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut sequences: Vec<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    sequences.sort_unstable();

    let expected: Vec<u64> = (1..=(THREADS * PER_THREAD) as u64).collect();
    assert_eq!(sequences, expected);
    assert_eq!(ledger.len().unwrap(), THREADS * PER_THREAD);
}

#[test]
fn test_racing_reviewers_only_one_wins() {
    let ledger = Arc::new(in_memory());
    let record = ledger
        .submit(DocumentPayload::Inline(b"contested".to_vec()), pdf("c.pdf"), &user(0))
        .unwrap();

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let ledger = Arc::clone(&ledger);
            let id = record.id.clone();
            thread::spawn(move || {
                let reviewer =
                    Principal::institute(format!("reg-{}", i), "Registrar", "State University");
                let outcome = if i % 2 == 0 {
                    ReviewOutcome::Verified
                } else {
                    ReviewOutcome::Rejected
                };
                ledger.review(&id, outcome, "", &reviewer)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, LedgerError::AlreadyReviewed { .. })));

    let stored = ledger.get(&record.id).unwrap();
    assert!(stored.status.is_terminal());
}

// =============================================================================
// PERSISTENCE
// =============================================================================

#[test]
fn test_file_ledger_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let ledger_path = dir.path().join("ledger.db");
    let blob_root = dir.path().join("blobs");
    std::fs::create_dir_all(&blob_root).unwrap();
    std::fs::write(blob_root.join("thesis.pdf"), b"%PDF-1.4 thesis").unwrap();

    let (first_id, digest) = {
        let ledger =
            FileLedgerService::open(&ledger_path, &blob_root, LedgerConfig::default()).unwrap();
        let first = ledger
            .submit(
                DocumentPayload::Blob("thesis.pdf".into()),
                pdf("thesis.pdf"),
                &user(1),
            )
            .unwrap();
        ledger
            .submit(DocumentPayload::Inline(b"second".to_vec()), pdf("b.pdf"), &user(2))
            .unwrap();
        ledger
            .review(&first.id, ReviewOutcome::Verified, "on file", &registrar())
            .unwrap();
        (first.id, first.digest)
    };

    let reopened =
        FileLedgerService::open(&ledger_path, &blob_root, LedgerConfig::default()).unwrap();
    assert_eq!(reopened.len().unwrap(), 2);

    let record = reopened.get(&first_id).unwrap();
    assert_eq!(record.status, RecordStatus::Verified);
    assert_eq!(record.review_comment(), Some("on file"));
    assert_eq!(record.digest, digest);

    let third = reopened
        .submit(DocumentPayload::Inline(b"third".to_vec()), pdf("c.pdf"), &user(3))
        .unwrap();
    assert_eq!(third.sequence_number, 3);

    let result = reopened.verify(&digest.to_hex()).unwrap();
    assert!(result.is_authentic());
}

#[test]
fn test_file_ledger_refuses_truncated_file() {
    let dir = tempfile::tempdir().unwrap();
    let ledger_path = dir.path().join("ledger.db");

    {
        let ledger =
            FileLedgerService::open(&ledger_path, dir.path(), LedgerConfig::default()).unwrap();
        ledger
            .submit(DocumentPayload::Inline(b"x".to_vec()), pdf("x.pdf"), &user(1))
            .unwrap();
    }

    let bytes = std::fs::read(&ledger_path).unwrap();
    std::fs::write(&ledger_path, &bytes[..bytes.len() - 3]).unwrap();

    let result = FileBackedKVStore::open(&ledger_path);
    assert!(result.is_err());
    let result = FileLedgerService::open(&ledger_path, dir.path(), LedgerConfig::default());
    assert!(matches!(result, Err(LedgerError::Serialization { .. })));
}

#[cfg(feature = "locking")]
#[test]
fn test_second_opener_is_refused_and_no_record_is_lost() {
    let dir = tempfile::tempdir().unwrap();
    let ledger_path = dir.path().join("ledger.db");
    let quick = LedgerConfig::default().with_lock_timeout(std::time::Duration::from_millis(50));

    let first = FileLedgerService::open(&ledger_path, dir.path(), quick.clone()).unwrap();
    let a = first
        .submit(DocumentPayload::Inline(b"bytes a".to_vec()), pdf("A.pdf"), &user(1))
        .unwrap();

    let second = FileLedgerService::open(&ledger_path, dir.path(), quick.clone());
    match second {
        Err(err) => {
            assert!(matches!(err, LedgerError::StoreUnavailable { .. }));
            assert!(err.is_retryable());
        }
        Ok(_) => panic!("a second opener must not share the ledger file"),
    }

    let b = first
        .submit(DocumentPayload::Inline(b"bytes b".to_vec()), pdf("B.pdf"), &user(2))
        .unwrap();
    assert_eq!((a.sequence_number, b.sequence_number), (1, 2));
    drop(first);

    let reopened = FileLedgerService::open(&ledger_path, dir.path(), quick).unwrap();
    assert_eq!(reopened.len().unwrap(), 2);
    assert_eq!(reopened.get(&a.id).unwrap().sequence_number, 1);
    assert_eq!(reopened.get(&b.id).unwrap().sequence_number, 2);
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_digest_is_stable(
        bytes in proptest::collection::vec(any::<u8>(), 0..4096),
        chunk in 1usize..512,
    ) {
        let hasher = Sha256ContentHasher::default();
        let once = hasher.digest(&bytes);
        prop_assert_eq!(once, hasher.digest(&bytes));
        prop_assert_eq!(once.to_hex().len(), 64);

        let streamed = Sha256ContentHasher::new(chunk)
            .digest_reader(&mut std::io::Cursor::new(&bytes))
            .unwrap();
        prop_assert_eq!(streamed.digest, once);
        prop_assert_eq!(streamed.size_bytes, bytes.len() as u64);
    }

    #[test]
    fn prop_sequences_strictly_increase(owners in proptest::collection::vec(0usize..4, 1..40)) {
        let ledger = in_memory();
        let mut last = 0;
        for (i, owner) in owners.iter().enumerate() {
            let record = ledger
                .submit(
                    DocumentPayload::Inline(vec![i as u8, *owner as u8]),
                    pdf(&format!("{}.pdf", i)),
                    &user(*owner),
                )
                .unwrap();
            prop_assert_eq!(record.sequence_number, last + 1);
            last = record.sequence_number;
        }

        let ids: HashSet<_> = ledger
            .list_by(&|_| true)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        prop_assert_eq!(ids.len(), owners.len());
    }

    #[test]
    fn prop_list_mine_is_owner_scoped(owners in proptest::collection::vec(0usize..3, 1..30)) {
        let ledger = in_memory();
        for (i, owner) in owners.iter().enumerate() {
            ledger
                .submit(
                    DocumentPayload::Inline(format!("doc {}", i).into_bytes()),
                    pdf(&format!("{}.pdf", i)),
                    &user(*owner),
                )
                .unwrap();
        }

        for owner in 0..3 {
            let mine = ledger.list_mine(&user(owner)).unwrap();
            let expected = owners.iter().filter(|&&o| o == owner).count();
            prop_assert_eq!(mine.len(), expected);
            let owner_id = PrincipalId::new(format!("user-{}", owner));
            prop_assert!(mine.iter().all(|r| r.submitter_id == owner_id));
            prop_assert!(mine.windows(2).all(|w| w[0].sequence_number > w[1].sequence_number));
        }
    }
}
