//! Chain validation.
//!
//! Walks the records in order and stops at the first one that is either
//! internally inconsistent (stored identity differs from the recomputed
//! digest) or not linked to its predecessor. Pure over the slice: no I/O, no
//! mutation.

use fcl_core::{IdentityScheme, ROOT_MARKER};
use thiserror::Error;

use crate::record::Record;

/// The first invalid record found while walking the chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record {index}: {kind}")]
pub struct Violation {
    /// Position of the offending record
    pub index: usize,
    pub kind: ViolationKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViolationKind {
    #[error("identity mismatch (stored {stored}, computed {computed})")]
    IdentityMismatch { stored: String, computed: String },

    #[error("broken link (expected previous {expected}, found {found})")]
    BrokenLink { expected: String, found: String },

    #[error("index mismatch (found {found})")]
    IndexMismatch { found: u64 },

    #[error("genesis does not start from the root marker (found {found})")]
    GenesisRoot { found: String },

    #[error("ledger holds no records")]
    Empty,
}

#[derive(Debug, Clone, Copy)]
pub struct VerifyOptions {
    pub scheme: IdentityScheme,
    /// Also check record 0. Without it the genesis record is trusted as-is.
    pub check_genesis: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            scheme: IdentityScheme::Concat,
            check_genesis: true,
        }
    }
}

/// Validate the whole chain, returning the first violation.
pub fn verify_chain(records: &[Record], opts: VerifyOptions) -> Result<(), Violation> {
    if records.is_empty() {
        return Err(Violation {
            index: 0,
            kind: ViolationKind::Empty,
        });
    }
    let start = if opts.check_genesis { 0 } else { 1 };
    (start..records.len()).try_for_each(|i| check_record(records, i, opts))
}

/// Validate a single record: its own identity and its link to `records[i - 1]`.
///
/// # Panics
/// If `i` is out of bounds.
pub fn check_record(records: &[Record], i: usize, opts: VerifyOptions) -> Result<(), Violation> {
    let record = &records[i];
    let fail = |kind| Err(Violation { index: i, kind });

    let computed = record.calculate_identity(opts.scheme);
    if record.identity != computed {
        return fail(ViolationKind::IdentityMismatch {
            stored: record.identity.clone(),
            computed,
        });
    }

    if i == 0 {
        if record.previous_identity != ROOT_MARKER {
            return fail(ViolationKind::GenesisRoot {
                found: record.previous_identity.clone(),
            });
        }
    } else {
        let previous = &records[i - 1];
        if record.previous_identity != previous.identity {
            return fail(ViolationKind::BrokenLink {
                expected: previous.identity.clone(),
                found: record.previous_identity.clone(),
            });
        }
    }

    if record.index != i as u64 {
        return fail(ViolationKind::IndexMismatch {
            found: record.index,
        });
    }

    Ok(())
}
