use serde::{Deserialize, Serialize};

/// `fileHash` of the genesis record.
pub const GENESIS_MARKER: &str = "Genesis Block";

/// `previousHash` of the genesis record.
pub const ROOT_MARKER: &str = "0";

/// How a record's identity digest input is laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityScheme {
    /// `index ++ timestamp ++ payload ++ previous ++ nonce`, integers in base 10.
    #[default]
    Concat,
    /// Like `Concat`, but the input starts with the arithmetic sum
    /// `index + timestamp`. Ledger files written by the legacy upload
    /// service were hashed this way.
    LegacySum,
}
