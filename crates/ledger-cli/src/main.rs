//! docledger: operator CLI for the document integrity ledger.
//!
//! Every subcommand opens the file-backed ledger, runs one core operation as
//! the principal given by `--as/--role`, and prints the result as JSON.

mod commands;
mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser};
use dl_01_document_ledger::FileLedgerService;
use shared_types::{Principal, PrincipalId, Role};
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::Command;
use crate::config::{load_config, CliConfig, Overrides};

/// Document integrity ledger
#[derive(Parser, Debug)]
#[command(name = "docledger")]
#[command(about = "Submit, review and verify documents in a hash-anchored ledger")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(flatten)]
    identity: IdentityArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Directory holding the ledger file (env: DOCLEDGER_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Root directory for --blob handles (env: DOCLEDGER_BLOB_ROOT)
    #[arg(long, global = true)]
    blob_root: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (env: DOCLEDGER_LOG)
    #[arg(long, global = true)]
    log: Option<String>,

    /// Largest accepted payload in bytes (env: DOCLEDGER_MAX_PAYLOAD_BYTES)
    #[arg(long, global = true)]
    max_payload_bytes: Option<u64>,

    /// Comma separated accepted content types, empty for any (env: DOCLEDGER_ALLOWED_TYPES)
    #[arg(long, global = true)]
    allowed_types: Option<String>,
}

/// Identity asserted by the caller. The ledger trusts it as supplied.
#[derive(Args, Debug)]
struct IdentityArgs {
    /// Principal id to act as
    #[arg(long = "as", global = true, default_value = "")]
    principal: String,

    /// Principal role: user or institute
    #[arg(long, global = true, default_value = "user")]
    role: Role,

    /// Display name
    #[arg(long, global = true, default_value = "")]
    name: String,

    /// Institution name (required for institute principals)
    #[arg(long, global = true)]
    institute: Option<String>,
}

impl IdentityArgs {
    fn principal(&self) -> Result<Principal> {
        let principal = Principal {
            id: PrincipalId::new(self.principal.trim()),
            role: self.role,
            display_name: self.name.clone(),
            institute_name: self.institute.clone(),
        };
        principal.validate().context("invalid identity flags")?;
        Ok(principal)
    }
}

impl From<GlobalArgs> for Overrides {
    fn from(args: GlobalArgs) -> Self {
        Overrides {
            data_dir: args.data_dir,
            blob_root: args.blob_root,
            log_level: args.log,
            max_payload_bytes: args.max_payload_bytes,
            allowed_types: args.allowed_types,
        }
    }
}

fn init_tracing(config: &CliConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config();
    config.apply(cli.global.into());
    init_tracing(&config)?;

    for warning in &config.warnings {
        warn!("{}", warning);
    }
    debug!(
        data_dir = %config.data_dir.display(),
        max_payload_bytes = config.max_payload_bytes,
        "Configuration loaded"
    );

    let principal = cli.identity.principal()?;
    let ledger_path = config.ledger_path();
    let ledger = FileLedgerService::open(&ledger_path, config.blob_root(), config.ledger_config())
        .with_context(|| format!("failed to open ledger at {}", ledger_path.display()))?;

    let output = commands::execute(&ledger, &principal, cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
