use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FclError, FclResult};
use crate::types::IdentityScheme;

/// Highest accepted mining difficulty. Each step multiplies the expected
/// digest count by 16; at 6 that is about 16.7M digests per record.
pub const MAX_DIFFICULTY: u32 = 6;

/// Top-level configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FclConfig {
    pub ledger: LedgerConfig,
    pub log: LogConfig,
}

impl FclConfig {
    /// Reject values the ledger cannot operate with.
    pub fn validate(&self) -> FclResult<()> {
        self.ledger.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Persisted ledger file (default: ~/.local/share/fcl/ledger.json)
    pub path: PathBuf,
    /// Leading '0' characters a mined identity must carry (default: 2)
    pub difficulty: u32,
    /// Mine every appended record before it is persisted (default: false)
    pub require_proof_of_work: bool,
    /// Also check the genesis record during validation (default: true)
    pub verify_genesis: bool,
    /// Digest input layout: "concat" or "legacy_sum"
    pub identity_scheme: IdentityScheme,
}

impl LedgerConfig {
    /// Ledger config rooted at an explicit file, all other fields default.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// The ledger path with a leading `~/` expanded.
    pub fn ledger_path(&self) -> PathBuf {
        expand_tilde(&self.path)
    }

    pub fn validate(&self) -> FclResult<()> {
        if self.difficulty > MAX_DIFFICULTY {
            return Err(FclError::Config(format!(
                "ledger.difficulty {} exceeds maximum {MAX_DIFFICULTY}",
                self.difficulty
            )));
        }
        if self.path.as_os_str().is_empty() {
            return Err(FclError::Config("ledger.path is empty".into()));
        }
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("~/.local/share/fcl/ledger.json"),
            difficulty: 2,
            require_proof_of_work: false,
            verify_genesis: true,
            identity_scheme: IdentityScheme::Concat,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Expand `~` in path to the user's home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_default();
        PathBuf::from(home).join(rest)
    } else {
        path.to_path_buf()
    }
}
