//! A single ledger entry.
//!
//! The identity is a SHA-256 digest (lowercase hex) over the record's other
//! fields, rendered as base-10 integers and raw strings with no separators:
//!
//! ```text
//! sha256( index ++ timestamp ++ fileHash ++ previousHash ++ nonce )
//! ```
//!
//! The serialized field names (`fileHash`, `previousHash`, `hash`) and the
//! digest layout are shared with ledger files written by other
//! implementations, so neither may change.

use fcl_core::{IdentityScheme, GENESIS_MARKER, ROOT_MARKER};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One entry in the ledger.
///
/// Fields are read-only outside this crate; a record is never changed after
/// it has been appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Position in the ledger, starting at 0
    pub(crate) index: u64,
    /// Creation time in milliseconds since the Unix epoch
    pub(crate) timestamp: u64,
    /// Caller-supplied content hash, or the genesis marker
    #[serde(rename = "fileHash")]
    pub(crate) payload_hash: String,
    /// Identity of the preceding record, or the root marker
    #[serde(rename = "previousHash")]
    pub(crate) previous_identity: String,
    /// Proof-of-work counter (0 unless the record was mined)
    pub(crate) nonce: u64,
    /// Digest over the fields above
    #[serde(rename = "hash")]
    pub(crate) identity: String,
}

impl Record {
    /// Create a record with `nonce = 0` and its identity computed immediately.
    pub fn create(
        index: u64,
        timestamp: u64,
        payload_hash: impl Into<String>,
        previous_identity: impl Into<String>,
    ) -> Self {
        Self::create_with(
            IdentityScheme::Concat,
            index,
            timestamp,
            payload_hash,
            previous_identity,
        )
    }

    /// Like [`Record::create`], hashing with the given identity scheme.
    pub fn create_with(
        scheme: IdentityScheme,
        index: u64,
        timestamp: u64,
        payload_hash: impl Into<String>,
        previous_identity: impl Into<String>,
    ) -> Self {
        let mut record = Record {
            index,
            timestamp,
            payload_hash: payload_hash.into(),
            previous_identity: previous_identity.into(),
            nonce: 0,
            identity: String::new(),
        };
        record.identity = record.calculate_identity(scheme);
        record
    }

    /// The first record of every ledger.
    pub fn genesis(scheme: IdentityScheme, timestamp: u64) -> Self {
        Self::create_with(scheme, 0, timestamp, GENESIS_MARKER, ROOT_MARKER)
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn payload_hash(&self) -> &str {
        &self.payload_hash
    }

    pub fn previous_identity(&self) -> &str {
        &self.previous_identity
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Whether this is shaped like a genesis record (index 0, root predecessor).
    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_identity == ROOT_MARKER
    }

    /// Recompute the identity from the stored fields (never reads `identity`).
    pub fn calculate_identity(&self, scheme: IdentityScheme) -> String {
        compute_identity(
            scheme,
            self.index,
            self.timestamp,
            &self.payload_hash,
            &self.previous_identity,
            self.nonce,
        )
    }

    /// True when the stored identity matches the recomputed one.
    pub fn is_self_consistent(&self, scheme: IdentityScheme) -> bool {
        self.identity == self.calculate_identity(scheme)
    }

    /// True when the identity starts with `difficulty` '0' characters.
    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        let wanted = difficulty as usize;
        self.identity.len() >= wanted && self.identity.bytes().take(wanted).all(|b| b == b'0')
    }

    /// Proof-of-work: bump the nonce until the identity meets `difficulty`.
    ///
    /// CPU-bound; expected work grows 16x per difficulty step. Returns the
    /// final nonce.
    pub fn mine(&mut self, difficulty: u32, scheme: IdentityScheme) -> u64 {
        while !self.meets_difficulty(difficulty) {
            self.nonce += 1;
            self.identity = self.calculate_identity(scheme);
        }
        tracing::debug!(
            index = self.index,
            nonce = self.nonce,
            difficulty,
            "record mined"
        );
        self.nonce
    }
}

/// Identity digest over a record's fields, as lowercase hex (64 chars).
pub fn compute_identity(
    scheme: IdentityScheme,
    index: u64,
    timestamp: u64,
    payload_hash: &str,
    previous_identity: &str,
    nonce: u64,
) -> String {
    let mut hasher = Sha256::new();
    match scheme {
        IdentityScheme::Concat => {
            hasher.update(index.to_string());
            hasher.update(timestamp.to_string());
        }
        IdentityScheme::LegacySum => {
            hasher.update(index.wrapping_add(timestamp).to_string());
        }
    }
    hasher.update(payload_hash.as_bytes());
    hasher.update(previous_identity.as_bytes());
    hasher.update(nonce.to_string());
    format!("{:x}", hasher.finalize())
}
