//! Processing strategy module for screening pipelines
//!
//! This module defines the Strategy pattern for complete screening pipelines,
//! covering CSV ingestion and the detection engine. Synchronous and
//! asynchronous implementations can be selected at runtime and produce
//! identical results for the same input.

use crate::cli::StrategyType;
use crate::io::csv_format::InvalidRowPolicy;
use crate::types::{DetectionError, DetectionResult, RuleConfig};
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete screening pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Read a CSV file and run every rule over it
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened
    /// - A required column is missing
    /// - A row is invalid and the policy is `Reject`
    /// - Detection fails (overflow, runtime failure, cancellation)
    fn detect(&self, input_path: &Path) -> Result<DetectionResult, DetectionError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// `batch` only applies to the async strategy.
pub fn create_strategy(
    strategy_type: StrategyType,
    rules: RuleConfig,
    policy: InvalidRowPolicy,
    batch: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(rules, policy)),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(
            rules,
            policy,
            batch.unwrap_or_default(),
        )),
    }
}
