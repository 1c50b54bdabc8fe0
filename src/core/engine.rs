//! Detection engine
//!
//! This module provides the single-threaded `DetectionEngine` that runs the
//! full pipeline over one ingested batch:
//!
//! 1. Static rule evaluation per record (`core::rules`)
//! 2. Structuring sweep per sender (`core::structuring`)
//! 3. Flag combination in ingestion order (`core::combiner`)
//! 4. Summary derivation (`core::summary`)
//!
//! The engine holds only the validated configuration; each run produces a
//! new, immutable `DetectionResult`.

use crate::core::combiner;
use crate::core::rules;
use crate::core::structuring::StructuringDetector;
use crate::types::{DetectionError, DetectionResult, RuleConfig, StaticFlags, TransactionBatch};
use tracing::info;

/// Single-threaded detection engine
#[derive(Debug, Clone)]
pub struct DetectionEngine {
    config: RuleConfig,
    structuring: StructuringDetector,
}

impl DetectionEngine {
    /// Create a new DetectionEngine for a validated configuration
    pub fn new(config: RuleConfig) -> Self {
        let structuring = StructuringDetector::new(&config);
        DetectionEngine {
            config,
            structuring,
        }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Run every rule over a batch
    ///
    /// An empty batch yields an empty result with zero counts.
    ///
    /// # Errors
    ///
    /// Returns an `ArithmeticOverflow` error if a window sum or the total
    /// volume overflows. No partial result is returned.
    pub fn detect(&self, batch: TransactionBatch) -> Result<DetectionResult, DetectionError> {
        let (columns, records) = batch.into_parts();
        info!(records = records.len(), "starting detection run");

        let static_flags: Vec<StaticFlags> = records
            .iter()
            .map(|record| rules::evaluate(record, &self.config))
            .collect();

        let structuring = self.structuring.detect(&records)?;

        let result = combiner::combine(columns, records, &static_flags, &structuring)?;
        info!(
            records = result.len(),
            suspicious = result.summary().suspicious_count,
            "detection run complete"
        );

        Ok(result)
    }
}

impl Default for DetectionEngine {
    fn default() -> Self {
        DetectionEngine::new(RuleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FlagSet, TransactionRecord};
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use rust_decimal::Decimal;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn tx(id: &str, sender: &str, offset_mins: i64, amount: i64, country: &str) -> TransactionRecord {
        TransactionRecord::new(
            id,
            sender,
            base() + TimeDelta::minutes(offset_mins),
            Decimal::new(amount, 0),
            country,
        )
        .unwrap()
    }

    fn run(records: Vec<TransactionRecord>) -> DetectionResult {
        let batch = TransactionBatch::from_records(records).unwrap();
        DetectionEngine::default().detect(batch).unwrap()
    }

    fn sample() -> Vec<TransactionRecord> {
        vec![
            tx("1", "alice", 0, 4000, "Germany"),
            tx("2", "bob", 5, 15000, "France"),
            tx("3", "alice", 60, 4000, "Germany"),
            tx("4", "carol", 90, 10, "Iran"),
            tx("5", "alice", 120, 4000, "Germany"),
            tx("6", "dave", 0, 4000, "Chile"),
            tx("7", "dave", 30, 4000, "Chile"),
        ]
    }

    #[test]
    fn test_empty_batch() {
        let result = run(vec![]);
        assert!(result.is_empty());
        assert_eq!(result.summary().total_transactions, 0);
        assert_eq!(result.summary().suspicious_percentage, 0.0);
    }

    #[test]
    fn test_sample_flags() {
        let result = run(sample());

        // alice: 3 x 4000 inside 2h
        for id in ["1", "3", "5"] {
            assert_eq!(result.flags_for(id), Some(FlagSet::new(false, false, true)));
        }
        assert_eq!(result.flags_for("2"), Some(FlagSet::new(true, false, false)));
        assert_eq!(result.flags_for("4"), Some(FlagSet::new(false, true, false)));
        // dave: 8000 total, below threshold
        assert_eq!(result.flags_for("6"), Some(FlagSet::default()));
        assert_eq!(result.flags_for("7"), Some(FlagSet::default()));
    }

    #[test]
    fn test_output_preserves_input_order() {
        let result = run(sample());
        let ids: Vec<_> = result.entries().iter().map(|e| e.record.id()).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5", "6", "7"]);
    }

    #[test]
    fn test_suspicious_is_union_for_every_record() {
        let result = run(sample());
        for entry in result.entries() {
            let f = entry.flags;
            assert_eq!(
                f.suspicious(),
                f.large_tx() || f.high_risk_country() || f.structuring()
            );
        }
    }

    #[test]
    fn test_detection_is_idempotent() {
        let engine = DetectionEngine::default();
        let batch = TransactionBatch::from_records(sample()).unwrap();

        let first = engine.detect(batch.clone()).unwrap();
        let second = engine.detect(batch).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reordering_input_does_not_change_flags() {
        let forward = run(sample());
        let mut reversed_records = sample();
        reversed_records.reverse();
        let reversed = run(reversed_records);

        for entry in forward.entries() {
            assert_eq!(reversed.flags_for(entry.record.id()), Some(entry.flags));
        }
    }

    #[test]
    fn test_summary_matches_direct_recount() {
        let result = run(sample());
        let summary = result.summary();
        let entries = result.entries();

        assert_eq!(summary.total_transactions, entries.len());
        assert_eq!(
            summary.suspicious_count,
            entries.iter().filter(|e| e.flags.suspicious()).count()
        );
        assert_eq!(
            summary.rule_counts.large_tx,
            entries.iter().filter(|e| e.flags.large_tx()).count()
        );
        assert_eq!(
            summary.rule_counts.structuring,
            entries.iter().filter(|e| e.flags.structuring()).count()
        );
        assert_eq!(
            summary.rule_counts.high_risk_country,
            entries.iter().filter(|e| e.flags.high_risk_country()).count()
        );
        let volume: Decimal = entries.iter().map(|e| e.record.amount()).sum();
        assert_eq!(summary.total_volume, volume);
        assert_eq!(summary.suspicious_percentage, 100.0 * 5.0 / 7.0);
    }

    #[test]
    fn test_custom_window_changes_outcome() {
        let config = RuleConfig::new(Decimal::new(10000, 0), TimeDelta::minutes(30), ["Iran"])
            .unwrap();
        let batch = TransactionBatch::from_records(sample()).unwrap();
        let result = DetectionEngine::new(config).detect(batch).unwrap();

        // alice's transactions are an hour apart: no window holds two of them
        assert!(!result.flags_for("1").unwrap().structuring());
    }
}
