//! fcl-ledger: append-only, hash-chained integrity ledger
//!
//! # Overview
//! - `record`: one ledger entry and its SHA-256 identity digest
//! - `chain`: the owning `Ledger` (bootstrap, append, lookup, validation)
//! - `verify`: chain walk reporting the first invalid record
//! - `store`: persistence backends (JSON file, in-memory)
//! - `shared`: single-writer handle for concurrent callers
//! - `digest`: SHA-256 helpers for computing payload hashes of content

pub mod chain;
pub mod digest;
pub mod record;
pub mod shared;
pub mod store;
pub mod verify;

pub use chain::{Attestation, Ledger};
pub use digest::{hash_file, sha256_hex};
pub use record::{compute_identity, Record};
pub use shared::SharedLedger;
pub use store::{JsonFileStore, LedgerStore, MemoryStore};
pub use verify::{verify_chain, VerifyOptions, Violation, ViolationKind};
