//! Benchmark suite for comparing detection strategies
//!
//! ```bash
//! cargo bench
//! ```
//!
//! Inputs are synthetic: transactions spread over a fixed pool of senders,
//! a few hours apart, with amounts that trigger every rule now and then.
//! Engine benchmarks run on in-memory batches; strategy benchmarks include
//! CSV parsing from a temporary file.

use aml_screening_engine::cli::StrategyType;
use aml_screening_engine::io::InvalidRowPolicy;
use aml_screening_engine::strategy::{create_strategy, BatchConfig};
use aml_screening_engine::{
    AsyncDetectionEngine, DetectionEngine, RuleConfig, TransactionBatch, TransactionRecord,
};
use chrono::{TimeDelta, TimeZone, Utc};
use rust_decimal::Decimal;
use std::io::Write;
use tempfile::NamedTempFile;

const SIZES: [usize; 3] = [100, 10_000, 100_000];
const SENDERS: usize = 500;
const COUNTRIES: [&str; 5] = ["Germany", "Chile", "Iran", "Peru", "France"];

fn main() {
    divan::main();
}

fn row(i: usize) -> (String, String, chrono::DateTime<Utc>, Decimal, &'static str) {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (
        format!("T{}", i),
        format!("S{}", i % SENDERS),
        base + TimeDelta::minutes((i / SENDERS) as i64 * 150),
        Decimal::new(((i * 7919) % 12_000) as i64 + 1, 0),
        COUNTRIES[i % COUNTRIES.len()],
    )
}

fn synthetic_batch(size: usize) -> TransactionBatch {
    let records = (0..size)
        .map(|i| {
            let (id, sender, ts, amount, country) = row(i);
            TransactionRecord::new(id, sender, ts, amount, country).unwrap()
        })
        .collect();
    TransactionBatch::from_records(records).unwrap()
}

fn synthetic_csv(size: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "transaction_id,sender_id,date,amount,country").unwrap();
    for i in 0..size {
        let (id, sender, ts, amount, country) = row(i);
        writeln!(file, "{},{},{},{},{}", id, sender, ts.to_rfc3339(), amount, country).unwrap();
    }
    file.flush().unwrap();
    file
}

#[divan::bench(args = SIZES)]
fn sync_engine(bencher: divan::Bencher, size: usize) {
    let engine = DetectionEngine::default();
    bencher
        .with_inputs(|| synthetic_batch(size))
        .bench_values(|batch| engine.detect(batch).expect("Detection failed"));
}

#[divan::bench(args = SIZES)]
fn async_engine(bencher: divan::Bencher, size: usize) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .build()
        .unwrap();
    let engine = AsyncDetectionEngine::new(RuleConfig::default());

    bencher
        .with_inputs(|| synthetic_batch(size))
        .bench_values(|batch| {
            runtime
                .block_on(engine.detect(batch))
                .expect("Detection failed")
        });
}

#[divan::bench(args = [StrategyType::Sync, StrategyType::Async])]
fn strategy_from_csv(bencher: divan::Bencher, strategy_type: StrategyType) {
    let input = synthetic_csv(10_000);
    let strategy = create_strategy(
        strategy_type,
        RuleConfig::default(),
        InvalidRowPolicy::Reject,
        Some(BatchConfig::default()),
    );

    bencher.bench(|| strategy.detect(input.path()).expect("Detection failed"));
}
