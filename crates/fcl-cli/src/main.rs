//! fcl: FortiCrypt integrity ledger CLI
//!
//! Commands:
//!   status                 - ledger location, size, latest record, validity
//!   append <hash>          - record an opaque content hash
//!   append-file <path>...  - SHA-256 files and record their digests
//!   verify                 - validate the full chain
//!   show [--index N]       - print records
//!   find <hash>            - is this content hash recorded, and intact?
//!   config show            - display current configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use fcl_core::config::{FclConfig, LedgerConfig};
use fcl_ledger::{Attestation, Ledger, Record, SharedLedger};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "fcl",
    version,
    about = "FortiCrypt integrity ledger",
    long_about = "fcl: record content hashes of encrypted files in a hash-chained ledger and audit it"
)]
struct Cli {
    /// Path to config.toml
    #[arg(long, short = 'c', env = "FCL_CONFIG", default_value = "/etc/fcl/config.toml")]
    config: PathBuf,

    /// Ledger file (overrides ledger.path in config)
    #[arg(long, env = "FCL_LEDGER")]
    ledger: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to log.level
    #[arg(long, env = "FCL_LOG")]
    log: Option<String>,

    /// Log format; defaults to log.format
    #[arg(long, env = "FCL_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, ValueEnum, PartialEq)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show ledger location, size, latest record, and validity
    Status,

    /// Append a content hash (treated as an opaque string)
    Append {
        /// Content hash, typically SHA-256 hex of an encrypted file
        hash: String,
    },

    /// Hash one or more files with SHA-256 and append each digest
    #[command(name = "append-file")]
    AppendFile {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Validate the whole chain; exits non-zero on the first invalid record
    Verify,

    /// Print ledger records
    Show {
        /// Only this record
        #[arg(long)]
        index: Option<usize>,
        /// Emit the on-disk JSON encoding
        #[arg(long)]
        json: bool,
    },

    /// Look up a content hash and check its record
    Find {
        hash: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, from_file) = load_config(&cli.config).await?;

    let level = cli.log.clone().unwrap_or_else(|| config.log.level.clone());
    let format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| parse_log_format(&config.log.format));
    init_logging(&level, &format);

    if !from_file {
        warn!("config file not found: {}  (using defaults)", cli.config.display());
    }

    let ledger_config = resolve_ledger_config(&config, cli.ledger.as_deref());

    match cli.command {
        Commands::Status => cmd_status(&ledger_config),
        Commands::Append { hash } => cmd_append(&ledger_config, &hash),
        Commands::AppendFile { paths } => cmd_append_file(&ledger_config, &paths).await,
        Commands::Verify => cmd_verify(&ledger_config),
        Commands::Show { index, json } => cmd_show(&ledger_config, index, json),
        Commands::Find { hash } => cmd_find(&ledger_config, &hash),
        Commands::Config { action: ConfigAction::Show } => {
            cmd_config_show(&config, &cli.config, from_file)
        }
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

/// Returns the config and whether it came from a file.
async fn load_config(path: &Path) -> Result<(FclConfig, bool)> {
    if !path.exists() {
        return Ok((FclConfig::default(), false));
    }
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading config: {}", path.display()))?;
    let config: FclConfig =
        toml::from_str(&content).with_context(|| format!("parsing config: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("validating config: {}", path.display()))?;
    Ok((config, true))
}

/// Ledger settings with the CLI path override applied: flag > config > default
fn resolve_ledger_config(config: &FclConfig, override_path: Option<&Path>) -> LedgerConfig {
    let mut ledger = config.ledger.clone();
    if let Some(p) = override_path {
        ledger.path = p.to_path_buf();
    }
    ledger
}

fn parse_log_format(s: &str) -> LogFormat {
    match s {
        "json" => LogFormat::Json,
        _ => LogFormat::Text,
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so command output on stdout stays scriptable.
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn open_ledger(config: &LedgerConfig) -> Result<Ledger> {
    Ledger::open(config)
        .with_context(|| format!("opening ledger: {}", config.ledger_path().display()))
}

// ── `fcl status` ──────────────────────────────────────────────────────────────

fn cmd_status(config: &LedgerConfig) -> Result<()> {
    let ledger = open_ledger(config)?;
    let latest = ledger.latest();

    println!("Ledger: {}", ledger.path().display());
    println!("  records:    {}", ledger.len());
    println!("  scheme:     {:?}", ledger.scheme());
    println!("  difficulty: {}", ledger.difficulty());
    println!(
        "  latest:     #{} {} ({})",
        latest.index(),
        short(latest.identity()),
        latest.timestamp()
    );
    match ledger.verify() {
        Ok(()) => println!("  status:     valid"),
        Err(v) => println!("  status:     INVALID ({v})"),
    }
    Ok(())
}

// ── `fcl append` ──────────────────────────────────────────────────────────────

fn cmd_append(config: &LedgerConfig, hash: &str) -> Result<()> {
    let mut ledger = open_ledger(config)?;
    let record = ledger
        .append(hash)
        .with_context(|| format!("appending to {}", ledger.path().display()))?;
    print_record(&record);
    Ok(())
}

// ── `fcl append-file` ─────────────────────────────────────────────────────────

async fn cmd_append_file(config: &LedgerConfig, paths: &[PathBuf]) -> Result<()> {
    // Hash everything before touching the ledger: one unreadable file fails
    // the whole command with nothing appended.
    let tasks: Vec<_> = paths
        .iter()
        .cloned()
        .map(|path| tokio::task::spawn_blocking(move || fcl_ledger::hash_file(&path)))
        .collect();

    let mut digests = Vec::with_capacity(paths.len());
    for (path, task) in paths.iter().zip(tasks) {
        let digest = task
            .await
            .context("hash task panicked")?
            .with_context(|| format!("hashing {}", path.display()))?;
        digests.push(digest);
    }

    let ledger = SharedLedger::new(open_ledger(config)?);
    for (path, digest) in paths.iter().zip(digests) {
        let record = ledger
            .append(digest)
            .await
            .with_context(|| format!("appending {}", path.display()))?;
        info!(path = %path.display(), index = record.index(), "file recorded");
        println!("{}", path.display());
        print_record(&record);
    }
    Ok(())
}

// ── `fcl verify` ──────────────────────────────────────────────────────────────

fn cmd_verify(config: &LedgerConfig) -> Result<()> {
    let ledger = open_ledger(config)?;
    match ledger.verify() {
        Ok(()) => {
            println!("Ledger valid: {} records", ledger.len());
            Ok(())
        }
        Err(violation) => {
            anyhow::bail!("ledger INVALID at {violation}")
        }
    }
}

// ── `fcl show` ────────────────────────────────────────────────────────────────

fn cmd_show(config: &LedgerConfig, index: Option<usize>, json: bool) -> Result<()> {
    let ledger = open_ledger(config)?;
    let records: &[Record] = match index {
        Some(i) => {
            let Some(record) = ledger.get(i) else {
                anyhow::bail!("no record at index {i} (ledger has {})", ledger.len());
            };
            std::slice::from_ref(record)
        }
        None => ledger.records(),
    };

    if json {
        let rendered =
            fcl_ledger::store::to_json(records).context("serializing records to JSON")?;
        println!("{rendered}");
    } else {
        for record in records {
            print_record(record);
        }
    }
    Ok(())
}

// ── `fcl find` ────────────────────────────────────────────────────────────────

fn cmd_find(config: &LedgerConfig, hash: &str) -> Result<()> {
    let ledger = open_ledger(config)?;
    match ledger.attest(hash) {
        Attestation::Unrecorded => {
            println!("{} — not recorded", short(hash));
        }
        Attestation::Verified(record) => {
            println!("{} — recorded and verified", short(hash));
            print_record(record);
        }
        Attestation::Inconsistent { record, violation } => {
            println!("{} — recorded but NOT verified ({violation})", short(hash));
            print_record(record);
        }
    }
    Ok(())
}

// ── `fcl config show` ─────────────────────────────────────────────────────────

fn cmd_config_show(config: &FclConfig, config_path: &Path, from_file: bool) -> Result<()> {
    if from_file {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}

// ── Formatting ────────────────────────────────────────────────────────────────

fn print_record(record: &Record) {
    println!("  #{}", record.index());
    println!("    timestamp: {}", record.timestamp());
    println!("    fileHash:  {}", record.payload_hash());
    println!("    previous:  {}", record.previous_identity());
    println!("    nonce:     {}", record.nonce());
    println!("    hash:      {}", record.identity());
}

/// First 16 chars of a hash for one-line output
fn short(hash: &str) -> &str {
    match hash.char_indices().nth(16) {
        Some((i, _)) => &hash[..i],
        None => hash,
    }
}
