//! Asynchronous detection engine
//!
//! Runs the same pipeline as [`crate::core::DetectionEngine`], but spreads
//! senders across tokio worker threads via [`BatchProcessor`]. Output order
//! matches ingestion order regardless of how senders were scheduled.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::BatchProcessor;
use crate::core::combiner;
use crate::types::{
    DetectionError, DetectionResult, FlagSet, RuleConfig, TransactionBatch, TransactionId,
};

/// Thread-safe detection engine with cooperative cancellation
#[derive(Debug, Clone)]
pub struct AsyncDetectionEngine {
    config: Arc<RuleConfig>,
    cancel: CancellationToken,
}

impl AsyncDetectionEngine {
    pub fn new(config: RuleConfig) -> Self {
        Self::with_cancellation(config, CancellationToken::new())
    }

    /// Create an engine that stops scheduling senders once `cancel` fires
    pub fn with_cancellation(config: RuleConfig, cancel: CancellationToken) -> Self {
        Self {
            config: Arc::new(config),
            cancel,
        }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Token that cancels in-flight runs of this engine
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run every rule over a batch, one task per sender
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the token fired before every sender was
    /// processed; no partial result is returned.
    pub async fn detect(&self, batch: TransactionBatch) -> Result<DetectionResult, DetectionError> {
        let (columns, records) = batch.into_parts();
        info!(records = records.len(), "starting async detection run");

        let records = Arc::new(records);
        let flags: Arc<DashMap<TransactionId, FlagSet>> = Arc::new(DashMap::new());

        let processor = BatchProcessor::new(Arc::clone(&self.config), Arc::clone(&flags));
        let senders = processor
            .process_batch(Arc::clone(&records), &self.cancel)
            .await?;
        drop(processor);

        let records = Arc::try_unwrap(records).unwrap_or_else(|shared| (*shared).clone());
        let flags: HashMap<TransactionId, FlagSet> = match Arc::try_unwrap(flags) {
            Ok(map) => map.into_iter().collect(),
            Err(shared) => shared
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value()))
                .collect(),
        };

        let result = combiner::assemble(columns, records, flags)?;
        info!(
            records = result.len(),
            senders = senders.len(),
            suspicious = result.summary().suspicious_count,
            "async detection run complete"
        );

        Ok(result)
    }
}
