use fcl_core::config::LedgerConfig;
use fcl_core::IdentityScheme;
use fcl_ledger::{sha256_hex, verify_chain, Ledger, MemoryStore, Record, VerifyOptions};

fn build_ledger(len: usize) -> Ledger<MemoryStore> {
    let mut ledger = Ledger::with_store(MemoryStore::new(), &LedgerConfig::default()).unwrap();
    for i in 1..len {
        ledger.append(sha256_hex(&(i as u64).to_le_bytes())).unwrap();
    }
    ledger
}

#[divan::bench]
fn record_create() -> Record {
    Record::create(
        divan::black_box(42),
        divan::black_box(1_700_000_000_000),
        divan::black_box("9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"),
        divan::black_box("0"),
    )
}

#[divan::bench(args = [10, 100, 1000])]
fn verify(bencher: divan::Bencher, len: usize) {
    let ledger = build_ledger(len);
    bencher.bench(|| verify_chain(divan::black_box(ledger.records()), VerifyOptions::default()));
}

#[divan::bench(args = [10, 100, 1000])]
fn append_memory(bencher: divan::Bencher, len: usize) {
    bencher
        .with_inputs(|| build_ledger(len))
        .bench_local_values(|mut ledger| ledger.append("payload").unwrap());
}

#[divan::bench(args = [10, 100, 1000])]
fn append_file(bencher: divan::Bencher, len: usize) {
    let tmp = tempfile::tempdir().unwrap();
    let mut ledger = Ledger::open_at(&tmp.path().join("ledger.json")).unwrap();
    for i in 1..len {
        ledger.append(format!("seed-{i}")).unwrap();
    }
    bencher.bench_local(|| ledger.append(divan::black_box("payload")).unwrap());
}

#[divan::bench(args = [1, 2, 3])]
fn mine(bencher: divan::Bencher, difficulty: u32) {
    bencher
        .with_inputs(|| Record::create(1, 1_700_000_000_000, "payload", "prev"))
        .bench_local_values(|mut record| record.mine(difficulty, IdentityScheme::Concat));
}

fn main() {
    divan::main();
}
