//! Subcommands and their mapping onto `DocumentLedgerApi`.

use anyhow::{Context, Result};
use clap::Subcommand;
use dl_01_document_ledger::{
    DocumentLedgerApi, DocumentPayload, LedgerFilter, RecordStatus, ReviewOutcome,
    SubmissionMetadata, TxId,
};
use serde::Serialize;
use serde_json::Value;
use shared_types::Principal;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Hash a document and append a pending record
    Submit {
        /// File to submit, or a handle under the blob root with --blob
        path: PathBuf,
        /// Treat PATH as a blob-store handle and stream it from there
        #[arg(long)]
        blob: bool,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// MIME type; guessed from the extension when omitted
        #[arg(long)]
        content_type: Option<String>,
        /// Recorded file name; defaults to the last path component
        #[arg(long)]
        file_name: Option<String>,
    },
    /// Verify or reject a pending record (institute principals)
    Review {
        tx_id: String,
        /// verified or rejected
        #[arg(long)]
        outcome: ReviewOutcome,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Look a document up by digest, transaction id or file name fragment
    Verify { query: String },
    /// Records submitted by the current principal
    Mine,
    /// Pending records awaiting review (institute principals)
    Pending,
    /// Records already reviewed (institute principals)
    Reviewed,
    /// Browse the ledger within the principal's scope
    Ledger {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<RecordStatus>,
    },
    /// Status counts within the principal's scope
    Stats,
    /// Show one record
    Show { tx_id: String },
}

/// Run one command and return its JSON result.
pub fn execute<L: DocumentLedgerApi>(
    ledger: &L,
    principal: &Principal,
    command: Command,
) -> Result<Value> {
    let value = match command {
        Command::Submit {
            path,
            blob,
            title,
            description,
            content_type,
            file_name,
        } => {
            let file_name = match file_name {
                Some(name) => name,
                None => default_file_name(&path)?,
            };
            let content_type = content_type.unwrap_or_else(|| guess_content_type(&file_name));
            let payload = if blob {
                DocumentPayload::Blob(path.to_string_lossy().into_owned())
            } else {
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                DocumentPayload::Inline(bytes)
            };
            let metadata = SubmissionMetadata::new(file_name, content_type)
                .with_title(title)
                .with_description(description);

            to_json(
                ledger
                    .submit(payload, metadata, principal)
                    .context("submit failed")?,
            )?
        }
        Command::Review {
            tx_id,
            outcome,
            comment,
        } => to_json(
            ledger
                .review(&TxId::new(tx_id), outcome, &comment, principal)
                .context("review failed")?,
        )?,
        Command::Verify { query } => {
            to_json(ledger.verify(&query).context("verify failed")?)?
        }
        Command::Mine => to_json(ledger.list_mine(principal)?)?,
        Command::Pending => to_json(ledger.list_pending_for_review(principal)?)?,
        Command::Reviewed => to_json(ledger.list_reviewed(principal)?)?,
        Command::Ledger { search, status } => {
            let filter = LedgerFilter { search, status };
            to_json(ledger.browse_ledger(principal, &filter)?)?
        }
        Command::Stats => to_json(ledger.ledger_stats(principal)?)?,
        Command::Show { tx_id } => {
            to_json(ledger.record(principal, &TxId::new(tx_id))?)?
        }
    };
    Ok(value)
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).context("failed to render result as JSON")
}

fn default_file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("cannot derive a file name from {}", path.display()))
}

fn guess_content_type(file_name: &str) -> String {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dl_01_document_ledger::{InMemoryLedgerService, LedgerConfig, LedgerError};

    fn ledger() -> InMemoryLedgerService {
        InMemoryLedgerService::new_in_memory(LedgerConfig::default()).unwrap()
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type("Deed.PDF"), "application/pdf");
        assert_eq!(guess_content_type("scan.jpeg"), "image/jpeg");
        assert_eq!(guess_content_type("README"), "application/octet-stream");
    }

    #[test]
    fn test_submit_then_review_round() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("diploma.pdf");
        std::fs::write(&file, b"%PDF diploma").unwrap();

        let ledger = ledger();
        let alice = Principal::user("alice", "Alice");
        let submitted = execute(
            &ledger,
            &alice,
            Command::Submit {
                path: file,
                blob: false,
                title: String::new(),
                description: String::new(),
                content_type: None,
                file_name: None,
            },
        )
        .unwrap();
        assert_eq!(submitted["status"], "pending");
        assert_eq!(submitted["title"], "diploma.pdf");
        let tx_id = submitted["id"].as_str().unwrap().to_string();

        let registrar = Principal::institute("reg", "Registrar", "State University");
        let reviewed = execute(
            &ledger,
            &registrar,
            Command::Review {
                tx_id,
                outcome: ReviewOutcome::Verified,
                comment: "matches archive".into(),
            },
        )
        .unwrap();
        assert_eq!(reviewed["status"], "verified");

        let stats = execute(&ledger, &alice, Command::Stats).unwrap();
        assert_eq!(stats["verified"], 1);
    }

    #[test]
    fn test_ledger_errors_keep_their_type() {
        let ledger = ledger();
        let err = execute(
            &ledger,
            &Principal::user("bob", "Bob"),
            Command::Pending,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LedgerError>(),
            Some(LedgerError::Forbidden { .. })
        ));
    }
}
