//! Synchronous processing strategy
//!
//! Single-threaded pipeline: `SyncReader` streams and validates rows into a
//! batch, then `DetectionEngine` flags it.

use crate::core::DetectionEngine;
use crate::io::csv_format::InvalidRowPolicy;
use crate::io::sync_reader::SyncReader;
use crate::strategy::ProcessingStrategy;
use crate::types::{DetectionError, DetectionResult, RuleConfig};
use std::path::Path;
use tracing::debug;

/// Synchronous processing strategy
///
/// ```no_run
/// use aml_screening_engine::io::InvalidRowPolicy;
/// use aml_screening_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use aml_screening_engine::types::RuleConfig;
/// use std::path::Path;
///
/// let strategy = SyncProcessingStrategy::new(RuleConfig::default(), InvalidRowPolicy::Reject);
/// let result = strategy.detect(Path::new("transactions.csv")).expect("Detection failed");
/// println!("{} suspicious", result.summary().suspicious_count);
/// ```
#[derive(Debug, Clone)]
pub struct SyncProcessingStrategy {
    engine: DetectionEngine,
    policy: InvalidRowPolicy,
}

impl SyncProcessingStrategy {
    pub fn new(rules: RuleConfig, policy: InvalidRowPolicy) -> Self {
        Self {
            engine: DetectionEngine::new(rules),
            policy,
        }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn detect(&self, input_path: &Path) -> Result<DetectionResult, DetectionError> {
        let batch = SyncReader::new(input_path)?.read_batch(self.policy)?;
        debug!(path = %input_path.display(), records = batch.len(), "input loaded");

        self.engine.detect(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn strategy(policy: InvalidRowPolicy) -> SyncProcessingStrategy {
        SyncProcessingStrategy::new(RuleConfig::default(), policy)
    }

    #[test]
    fn test_sync_strategy_flags_large_transaction() {
        let file = create_temp_csv(
            "transaction_id,sender_id,date,amount,country\nT1,S1,2024-01-01,15000,France\n",
        );

        let result = strategy(InvalidRowPolicy::Reject).detect(file.path()).unwrap();
        let flags = result.flags_for("T1").unwrap();
        assert!(flags.large_tx());
        assert!(!flags.structuring());
        assert!(flags.suspicious());
    }

    #[test]
    fn test_sync_strategy_handles_missing_file() {
        let result = strategy(InvalidRowPolicy::Reject).detect(Path::new("nonexistent.csv"));
        assert!(result.unwrap_err().to_string().contains("Failed to open file"));
    }

    #[test]
    fn test_sync_strategy_missing_column_never_runs() {
        let file = create_temp_csv("transaction_id,sender_id,date,amount\nT1,S1,2024-01-01,1\n");
        let result = strategy(InvalidRowPolicy::Skip).detect(file.path());
        assert_eq!(result, Err(DetectionError::schema(&["country"])));
    }

    #[test]
    fn test_sync_strategy_skips_malformed_record() {
        let file = create_temp_csv(
            "transaction_id,sender_id,date,amount,country\n\
             T1,S1,2024-01-01,100,Chile\n\
             T2,S2,2024-01-01,invalid,Chile\n\
             T3,S3,2024-01-01,50,Chile\n",
        );

        let result = strategy(InvalidRowPolicy::Skip).detect(file.path()).unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.flags_for("T2").is_none());

        let rejected = strategy(InvalidRowPolicy::Reject).detect(file.path());
        assert!(matches!(rejected, Err(DetectionError::Validation { line: Some(3), .. })));
    }

    #[test]
    fn test_sync_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncProcessingStrategy>();
    }
}
