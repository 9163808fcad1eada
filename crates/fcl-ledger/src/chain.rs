//! The ledger: an ordered, append-only sequence of records backed by a store.
//!
//! Construction loads the persisted sequence as-is (identities are not
//! recomputed on load) or, when nothing has been persisted, bootstraps and
//! persists a genesis record. After construction the sequence is never empty.
//!
//! Each append persists the full sequence before returning. If the save
//! fails the new record is dropped again, so memory never runs ahead of disk.
//!
//! `Ledger` is a plain owned value: appends need `&mut self`. Share it between
//! concurrent callers through [`crate::SharedLedger`].

use fcl_core::config::LedgerConfig;
use fcl_core::{FclError, FclResult, IdentityScheme};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::record::Record;
use crate::store::{JsonFileStore, LedgerStore};
use crate::verify::{check_record, verify_chain, VerifyOptions, Violation};

pub struct Ledger<S = JsonFileStore> {
    records: Vec<Record>,
    store: S,
    difficulty: u32,
    require_proof_of_work: bool,
    verify_genesis: bool,
    scheme: IdentityScheme,
}

/// Outcome of looking up one payload hash in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attestation<'a> {
    /// No record carries this payload hash.
    Unrecorded,
    /// Recorded, and the record is consistent and linked to its predecessor.
    Verified(&'a Record),
    /// Recorded, but the record fails validation.
    Inconsistent {
        record: &'a Record,
        violation: Violation,
    },
}

impl Ledger<JsonFileStore> {
    /// Open the ledger file named by `config`, bootstrapping it on first run.
    pub fn open(config: &LedgerConfig) -> FclResult<Self> {
        Self::with_store(JsonFileStore::new(config.ledger_path()), config)
    }

    /// Open a ledger file with default settings.
    pub fn open_at(path: &Path) -> FclResult<Self> {
        Self::open(&LedgerConfig::at(path))
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }
}

impl<S: LedgerStore> Ledger<S> {
    /// Load from `store`, or bootstrap a genesis record into it.
    ///
    /// `config.path` is ignored; the store decides where records live.
    pub fn with_store(mut store: S, config: &LedgerConfig) -> FclResult<Self> {
        config.validate()?;
        let scheme = config.identity_scheme;

        let records = match store.load()? {
            Some(records) if records.is_empty() => {
                return Err(FclError::corrupt(store.location(), "ledger holds no records"));
            }
            Some(records) => {
                info!(
                    location = %store.location(),
                    records = records.len(),
                    "ledger loaded"
                );
                records
            }
            None => {
                let mut genesis = Record::genesis(scheme, now_millis());
                if config.require_proof_of_work {
                    genesis.mine(config.difficulty, scheme);
                }
                store.save(std::slice::from_ref(&genesis))?;
                info!(
                    location = %store.location(),
                    identity = %genesis.identity(),
                    "ledger bootstrapped with genesis record"
                );
                vec![genesis]
            }
        };

        Ok(Ledger {
            records,
            store,
            difficulty: config.difficulty,
            require_proof_of_work: config.require_proof_of_work,
            verify_genesis: config.verify_genesis,
            scheme,
        })
    }

    /// Most recently appended record (genesis on a fresh ledger).
    pub fn latest(&self) -> &Record {
        // Construction guarantees at least the genesis record.
        &self.records[self.records.len() - 1]
    }

    /// Append a record attesting to `payload_hash` and persist the ledger.
    ///
    /// The payload hash is opaque: it is neither validated nor re-hashed.
    pub fn append(&mut self, payload_hash: impl Into<String>) -> FclResult<Record> {
        let previous = self.latest();
        let mut record = Record::create_with(
            self.scheme,
            self.records.len() as u64,
            now_millis(),
            payload_hash,
            previous.identity(),
        );
        if self.require_proof_of_work {
            record.mine(self.difficulty, self.scheme);
        }

        self.records.push(record.clone());
        if let Err(e) = self.store.save(&self.records) {
            self.records.pop();
            warn!(index = record.index(), "append rolled back: {e}");
            return Err(e);
        }

        debug!(
            index = record.index(),
            identity = %&record.identity()[..16],
            "record appended"
        );
        Ok(record)
    }

    /// Validate the whole chain, reporting the first invalid record.
    pub fn verify(&self) -> Result<(), Violation> {
        let result = verify_chain(&self.records, self.verify_options());
        if let Err(ref violation) = result {
            warn!(index = violation.index, "ledger validation failed: {violation}");
        }
        result
    }

    pub fn is_valid(&self) -> bool {
        self.verify().is_ok()
    }

    /// First record carrying `payload_hash`.
    pub fn find_by_payload(&self, payload_hash: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.payload_hash() == payload_hash)
    }

    pub fn contains_payload(&self, payload_hash: &str) -> bool {
        self.find_by_payload(payload_hash).is_some()
    }

    /// Check one payload: is it recorded, and does its record hold up?
    pub fn attest(&self, payload_hash: &str) -> Attestation<'_> {
        let Some(pos) = self
            .records
            .iter()
            .position(|r| r.payload_hash() == payload_hash)
        else {
            return Attestation::Unrecorded;
        };
        let record = &self.records[pos];
        match check_record(&self.records, pos, self.verify_options()) {
            Ok(()) => Attestation::Verified(record),
            Err(violation) => Attestation::Inconsistent { record, violation },
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false after construction.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn scheme(&self) -> IdentityScheme {
        self.scheme
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn verify_options(&self) -> VerifyOptions {
        VerifyOptions {
            scheme: self.scheme,
            check_genesis: self.verify_genesis,
        }
    }
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use fcl_core::{GENESIS_MARKER, ROOT_MARKER};

    struct FailingStore {
        inner: MemoryStore,
        fail: bool,
    }

    impl LedgerStore for FailingStore {
        fn location(&self) -> String {
            "failing".into()
        }
        fn load(&self) -> FclResult<Option<Vec<Record>>> {
            self.inner.load()
        }
        fn save(&mut self, records: &[Record]) -> FclResult<()> {
            if self.fail {
                return Err(FclError::persistence(
                    self.location(),
                    std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
                ));
            }
            self.inner.save(records)
        }
    }

    fn memory_ledger() -> Ledger<MemoryStore> {
        Ledger::with_store(MemoryStore::new(), &LedgerConfig::default()).unwrap()
    }

    #[test]
    fn bootstrap_persists_genesis() {
        let ledger = memory_ledger();
        assert_eq!(ledger.len(), 1);
        let genesis = ledger.latest();
        assert_eq!(genesis.payload_hash(), GENESIS_MARKER);
        assert_eq!(genesis.previous_identity(), ROOT_MARKER);
        assert_eq!(ledger.store().saves(), 1);
        assert!(ledger.is_valid());
        assert_eq!(ledger.difficulty(), 2);
    }

    #[test]
    fn append_links_to_latest() {
        let mut ledger = memory_ledger();
        let genesis_id = ledger.latest().identity().to_string();

        let record = ledger.append("a3f5e91").unwrap();
        assert_eq!(record.index(), 1);
        assert_eq!(record.previous_identity(), genesis_id);
        assert_eq!(record.payload_hash(), "a3f5e91");
        assert_eq!(record.nonce(), 0);
        assert_eq!(ledger.latest(), &record);
        assert_eq!(ledger.store().records().unwrap().len(), 2);
    }

    #[test]
    fn empty_persisted_sequence_is_corrupt() {
        let store = MemoryStore::with_records(Vec::new());
        let err = Ledger::with_store(store, &LedgerConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, FclError::CorruptLedger { .. }));
    }

    #[test]
    fn failed_save_rolls_back() {
        let store = FailingStore {
            inner: MemoryStore::new(),
            fail: false,
        };
        let mut ledger = Ledger::with_store(store, &LedgerConfig::default()).unwrap();
        ledger.append("first").unwrap();

        ledger.store.fail = true;
        let err = ledger.append("second").unwrap_err();
        assert!(matches!(err, FclError::Persistence { .. }));
        assert_eq!(ledger.len(), 2);
        assert!(!ledger.contains_payload("second"));

        ledger.store.fail = false;
        let record = ledger.append("second").unwrap();
        assert_eq!(record.index(), 2);
        assert!(ledger.is_valid());
    }

    #[test]
    fn proof_of_work_mines_appends() {
        let config = LedgerConfig {
            require_proof_of_work: true,
            difficulty: 1,
            ..LedgerConfig::default()
        };
        let mut ledger = Ledger::with_store(MemoryStore::new(), &config).unwrap();
        assert!(ledger.latest().meets_difficulty(1));

        let record = ledger.append("payload").unwrap();
        assert!(record.identity().starts_with('0'));
        assert!(ledger.is_valid());
    }

    #[test]
    fn invalid_config_rejected() {
        let config = LedgerConfig {
            difficulty: 65,
            ..LedgerConfig::default()
        };
        assert!(matches!(
            Ledger::with_store(MemoryStore::new(), &config),
            Err(FclError::Config(_))
        ));
    }

    #[test]
    fn attest_reports_status() {
        let mut ledger = memory_ledger();
        ledger.append("aaaa").unwrap();
        ledger.append("bbbb").unwrap();

        assert_eq!(ledger.attest("cccc"), Attestation::Unrecorded);
        match ledger.attest("bbbb") {
            Attestation::Verified(record) => assert_eq!(record.index(), 2),
            other => panic!("expected verified, got {other:?}"),
        }

        ledger.records[1].payload_hash = "aaaa-forged".into();
        assert_eq!(ledger.attest("aaaa"), Attestation::Unrecorded);
        match ledger.attest("aaaa-forged") {
            Attestation::Inconsistent { violation, .. } => assert_eq!(violation.index, 1),
            other => panic!("expected inconsistent, got {other:?}"),
        }
        // The later record is still linked to the stored identity of record 1.
        assert!(matches!(ledger.attest("bbbb"), Attestation::Verified(_)));
        assert!(!ledger.is_valid());
    }

    #[test]
    fn lookup_helpers() {
        let mut ledger = memory_ledger();
        ledger.append("deadbeef").unwrap();

        assert!(ledger.contains_payload("deadbeef"));
        assert_eq!(ledger.find_by_payload("deadbeef").unwrap().index(), 1);
        assert_eq!(ledger.get(0).unwrap().payload_hash(), GENESIS_MARKER);
        assert!(ledger.get(2).is_none());
        assert!(!ledger.is_empty());
    }

    #[test]
    fn records_have_monotonic_indices() {
        let mut ledger = memory_ledger();
        for i in 0..10 {
            ledger.append(format!("payload-{i}")).unwrap();
        }
        for (i, record) in ledger.records().iter().enumerate() {
            assert_eq!(record.index(), i as u64);
        }
    }
}
