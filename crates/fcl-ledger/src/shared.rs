//! Process-wide ledger handle for concurrent callers.
//!
//! One `Ledger` is opened at startup and wrapped here; clones share it. The
//! whole read-latest, build, persist sequence of an append runs under one
//! mutex, so at most one append mutates the sequence at a time. Validation
//! and reads take the same lock and therefore see a consistent snapshot.

use fcl_core::{FclError, FclResult};
use std::sync::Arc;
use tokio::sync::Mutex as TokioMutex;

use crate::chain::Ledger;
use crate::record::Record;
use crate::store::{JsonFileStore, LedgerStore};
use crate::verify::Violation;

pub struct SharedLedger<S = JsonFileStore> {
    inner: Arc<TokioMutex<Ledger<S>>>,
}

impl<S> Clone for SharedLedger<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: LedgerStore + Send + 'static> SharedLedger<S> {
    pub fn new(ledger: Ledger<S>) -> Self {
        Self {
            inner: Arc::new(TokioMutex::new(ledger)),
        }
    }

    /// Append under the writer lock. The blocking store write runs on the
    /// blocking pool while the lock is held.
    pub async fn append(&self, payload_hash: impl Into<String>) -> FclResult<Record> {
        let payload_hash = payload_hash.into();
        let mut guard = Arc::clone(&self.inner).lock_owned().await;
        tokio::task::spawn_blocking(move || guard.append(payload_hash))
            .await
            .map_err(|e| FclError::Other(anyhow::anyhow!("append task failed: {e}")))?
    }

    pub async fn verify(&self) -> Result<(), Violation> {
        self.inner.lock().await.verify()
    }

    pub async fn is_valid(&self) -> bool {
        self.inner.lock().await.is_valid()
    }

    /// Copy of the current record sequence.
    pub async fn snapshot(&self) -> Vec<Record> {
        self.inner.lock().await.records().to_vec()
    }

    pub async fn latest(&self) -> Record {
        self.inner.lock().await.latest().clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn find_by_payload(&self, payload_hash: &str) -> Option<Record> {
        self.inner.lock().await.find_by_payload(payload_hash).cloned()
    }

    /// Run a read-only closure against the ledger under the lock.
    pub async fn read<R>(&self, f: impl FnOnce(&Ledger<S>) -> R) -> R {
        let guard = self.inner.lock().await;
        f(&*guard)
    }
}
