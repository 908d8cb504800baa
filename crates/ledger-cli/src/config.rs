//! # CLI Configuration
//!
//! Defaults, then `DOCLEDGER_*` environment variables, then command-line flags.

use dl_01_document_ledger::LedgerConfig;
use std::path::PathBuf;

pub const ENV_DATA_DIR: &str = "DOCLEDGER_DATA_DIR";
pub const ENV_BLOB_ROOT: &str = "DOCLEDGER_BLOB_ROOT";
pub const ENV_LOG: &str = "DOCLEDGER_LOG";
pub const ENV_MAX_PAYLOAD_BYTES: &str = "DOCLEDGER_MAX_PAYLOAD_BYTES";
pub const ENV_ALLOWED_TYPES: &str = "DOCLEDGER_ALLOWED_TYPES";

/// Resolved CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Directory holding `ledger.db`.
    pub data_dir: PathBuf,
    /// Root for `--blob` handles. Defaults to `<data_dir>/blobs`.
    pub blob_root: Option<PathBuf>,
    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub max_payload_bytes: u64,
    pub allowed_types: Vec<String>,
    /// Environment values that could not be parsed; logged once tracing is up.
    pub warnings: Vec<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        let ledger = LedgerConfig::default();
        Self {
            data_dir: PathBuf::from("./docledger-data"),
            blob_root: None,
            log_level: "warn".to_string(),
            max_payload_bytes: ledger.max_payload_bytes,
            allowed_types: ledger.allowed_content_types,
            warnings: Vec::new(),
        }
    }
}

/// Flag values that override the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub blob_root: Option<PathBuf>,
    pub log_level: Option<String>,
    pub max_payload_bytes: Option<u64>,
    pub allowed_types: Option<String>,
}

/// Load configuration from the process environment.
pub fn load_config() -> CliConfig {
    from_lookup(|key| std::env::var(key).ok())
}

/// Load configuration from an arbitrary variable lookup.
pub fn from_lookup<F>(lookup: F) -> CliConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = CliConfig::default();

    if let Some(dir) = lookup(ENV_DATA_DIR) {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(dir) = lookup(ENV_BLOB_ROOT) {
        config.blob_root = Some(PathBuf::from(dir));
    }
    if let Some(level) = lookup(ENV_LOG) {
        config.log_level = level;
    }
    if let Some(raw) = lookup(ENV_MAX_PAYLOAD_BYTES) {
        match raw.trim().parse() {
            Ok(bytes) => config.max_payload_bytes = bytes,
            Err(_) => config.warnings.push(format!(
                "{} must be a byte count, ignoring '{}'",
                ENV_MAX_PAYLOAD_BYTES, raw
            )),
        }
    }
    if let Some(raw) = lookup(ENV_ALLOWED_TYPES) {
        config.allowed_types = split_types(&raw);
    }

    config
}

fn split_types(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

impl CliConfig {
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(dir) = overrides.data_dir {
            self.data_dir = dir;
        }
        if let Some(dir) = overrides.blob_root {
            self.blob_root = Some(dir);
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        if let Some(bytes) = overrides.max_payload_bytes {
            self.max_payload_bytes = bytes;
        }
        if let Some(raw) = overrides.allowed_types {
            self.allowed_types = split_types(&raw);
        }
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("ledger.db")
    }

    pub fn blob_root(&self) -> PathBuf {
        self.blob_root
            .clone()
            .unwrap_or_else(|| self.data_dir.join("blobs"))
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig::default()
            .with_max_payload_bytes(self.max_payload_bytes)
            .with_allowed_content_types(self.allowed_types.iter().cloned())
    }
}
