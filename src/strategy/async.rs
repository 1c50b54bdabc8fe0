//! Asynchronous processing strategy
//!
//! Reads the input in chunks with csv-async, then runs detection on a tokio
//! multi-threaded runtime with one task per sender.
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (chunked CSV reading)
//!     └── AsyncDetectionEngine
//!         └── BatchProcessor (sender partitioning + tasks)
//! ```
//!
//! Structuring windows span a sender's whole history, so the complete batch
//! is assembled before any sender is processed.

use crate::core::AsyncDetectionEngine;
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::InvalidRowPolicy;
use crate::strategy::ProcessingStrategy;
use crate::types::{DetectionError, DetectionResult, RuleConfig};
use std::path::Path;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Configuration for chunked reading and parallel detection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of rows read per chunk
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig; zero values fall back to the defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                requested = batch_size,
                fallback = default.batch_size,
                "invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                requested = max_concurrent_batches,
                fallback = default.max_concurrent_batches,
                "invalid max_concurrent_batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    rules: RuleConfig,
    policy: InvalidRowPolicy,
    config: BatchConfig,
    cancel: CancellationToken,
}

impl AsyncProcessingStrategy {
    pub fn new(rules: RuleConfig, policy: InvalidRowPolicy, config: BatchConfig) -> Self {
        Self {
            rules,
            policy,
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn batch_config(&self) -> &BatchConfig {
        &self.config
    }

    /// Token that cancels detection runs started by this strategy
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn detect(&self, input_path: &Path) -> Result<DetectionResult, DetectionError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| DetectionError::runtime(format!("Failed to create tokio runtime: {}", e)))?;

        runtime.block_on(async {
            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| DetectionError::Io {
                    message: format!("Failed to open file '{}': {}", input_path.display(), e),
                })?;

            let reader = AsyncReader::new(file.compat()).await?;
            let batch = reader.read_batch(self.config.batch_size, self.policy).await?;
            debug!(path = %input_path.display(), records = batch.len(), "input loaded");

            let engine = AsyncDetectionEngine::with_cancellation(self.rules.clone(), self.cancel.clone());
            engine.detect(batch).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::SyncProcessingStrategy;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn strategy(config: BatchConfig) -> AsyncProcessingStrategy {
        AsyncProcessingStrategy::new(RuleConfig::default(), InvalidRowPolicy::Reject, config)
    }

    #[rstest]
    #[case::both_zero(0, 0, 1000, num_cpus::get())]
    #[case::zero_batch(0, 3, 1000, 3)]
    #[case::zero_workers(50, 0, 50, num_cpus::get())]
    #[case::explicit(50, 3, 50, 3)]
    fn test_batch_config_fallbacks(
        #[case] batch_size: usize,
        #[case] workers: usize,
        #[case] expected_batch: usize,
        #[case] expected_workers: usize,
    ) {
        let config = BatchConfig::new(batch_size, workers);
        assert_eq!(config.batch_size, expected_batch);
        assert_eq!(config.max_concurrent_batches, expected_workers);
    }

    #[test]
    fn test_async_strategy_handles_missing_file() {
        let result = strategy(BatchConfig::default()).detect(Path::new("nonexistent.csv"));
        let err = result.unwrap_err();
        assert!(matches!(err, DetectionError::Io { .. }));
        assert!(err.to_string().contains("Failed to open file"));
    }

    #[test]
    fn test_async_strategy_small_chunks_match_sync() {
        // Sender S1's window straddles every chunk boundary
        let file = create_temp_csv(
            "transaction_id,sender_id,date,amount,country\n\
             T1,S1,2024-01-01T00:00:00Z,4000,Chile\n\
             T2,S2,2024-01-01T01:00:00Z,100,Syria\n\
             T3,S1,2024-01-01T05:00:00Z,4000,Chile\n\
             T4,S2,2024-01-01T06:00:00Z,20000,Peru\n\
             T5,S1,2024-01-02T00:00:00Z,4000,Chile\n",
        );

        let expected = SyncProcessingStrategy::new(RuleConfig::default(), InvalidRowPolicy::Reject)
            .detect(file.path())
            .unwrap();
        let actual = strategy(BatchConfig::new(2, 2)).detect(file.path()).unwrap();

        assert_eq!(actual, expected);
        assert!(actual.flags_for("T5").unwrap().structuring());
    }

    #[test]
    fn test_async_strategy_cancelled() {
        let file = create_temp_csv(
            "transaction_id,sender_id,date,amount,country\nT1,S1,2024-01-01,1,Chile\n",
        );
        let strategy = strategy(BatchConfig::default());
        strategy.cancellation_token().cancel();

        let result = strategy.detect(file.path());
        assert!(matches!(result, Err(DetectionError::Cancelled { .. })));
    }

    #[test]
    fn test_async_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AsyncProcessingStrategy>();
    }
}
