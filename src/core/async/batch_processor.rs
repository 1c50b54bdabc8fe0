//! Batch processing with sender-based partitioning for async detection
//!
//! This module provides the `BatchProcessor` struct, which partitions a batch
//! by sender and runs each sender's detection as an independent tokio task.
//!
//! # Design
//!
//! Every rule a record needs can be computed from its own sender's
//! transactions: static rules look only at the record, and the structuring
//! sweep groups by sender. A sender is therefore an atomic unit of work:
//!
//! - each task evaluates static rules and the structuring sweep for one sender
//! - results are accumulated locally, then published to the shared
//!   `DashMap` in one step, so a sender's flags are either fully present or
//!   absent
//! - the cancellation token is checked before a sender starts, never midway
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     ├── Arc<RuleConfig>                        (shared, read-only)
//!     ├── StructuringDetector                    (per-sender sweep)
//!     └── Arc<DashMap<TransactionId, FlagSet>>   (published flags)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::core::rules;
use crate::core::structuring::StructuringDetector;
use crate::types::{
    DetectionError, FlagSet, RuleConfig, SenderId, TransactionId, TransactionRecord,
};

/// Outcome of processing one sender
#[derive(Debug, Clone, PartialEq)]
pub struct SenderResult {
    /// The sender whose transactions were processed
    pub sender: SenderId,

    /// Number of the sender's transactions
    pub transactions: usize,

    /// Number of the sender's transactions flagged suspicious
    pub suspicious: usize,
}

/// Batch processor with sender-based partitioning
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    config: Arc<RuleConfig>,
    detector: StructuringDetector,
    flags: Arc<DashMap<TransactionId, FlagSet>>,
}

impl BatchProcessor {
    /// Create a new BatchProcessor publishing into `flags`
    pub fn new(config: Arc<RuleConfig>, flags: Arc<DashMap<TransactionId, FlagSet>>) -> Self {
        let detector = StructuringDetector::new(&config);
        Self {
            config,
            detector,
            flags,
        }
    }

    /// Partition a batch into per-sender lists of record positions
    ///
    /// Each record position appears in exactly one list, and each list keeps
    /// input order.
    pub fn partition_by_sender(
        &self,
        records: &[TransactionRecord],
    ) -> HashMap<SenderId, Vec<usize>> {
        let mut sender_batches: HashMap<SenderId, Vec<usize>> = HashMap::new();

        for (position, record) in records.iter().enumerate() {
            sender_batches
                .entry(record.sender_id().to_string())
                .or_default()
                .push(position);
        }

        sender_batches
    }

    /// Compute and publish every flag for one sender
    ///
    /// Nothing is published unless the whole sender succeeds.
    pub fn process_sender(
        &self,
        sender: &str,
        records: &[TransactionRecord],
        positions: &[usize],
    ) -> Result<SenderResult, DetectionError> {
        let transactions: Vec<&TransactionRecord> =
            positions.iter().map(|&pos| &records[pos]).collect();

        let structuring = self.detector.sweep_sender(sender, &transactions)?;

        let sender_flags: Vec<(TransactionId, FlagSet)> = transactions
            .iter()
            .map(|record| {
                let static_flags = rules::evaluate(record, &self.config);
                let flags = FlagSet::combine(static_flags, structuring.contains(record.id()));
                (record.id().to_string(), flags)
            })
            .collect();

        let suspicious = sender_flags.iter().filter(|(_, f)| f.suspicious()).count();
        for (id, flags) in sender_flags {
            self.flags.insert(id, flags);
        }

        Ok(SenderResult {
            sender: sender.to_string(),
            transactions: transactions.len(),
            suspicious,
        })
    }

    /// Process a batch with one task per sender
    ///
    /// 1. Partition the batch by sender
    /// 2. Spawn a tokio task per sender; each checks the token before starting
    /// 3. Wait for every task and collect the results
    ///
    /// # Errors
    ///
    /// - `Cancelled` if the token fired before every sender ran
    /// - the first sender error (e.g. `ArithmeticOverflow`)
    /// - `Runtime` if a task panicked
    pub async fn process_batch(
        &self,
        records: Arc<Vec<TransactionRecord>>,
        cancel: &CancellationToken,
    ) -> Result<Vec<SenderResult>, DetectionError> {
        let sender_batches = self.partition_by_sender(&records);
        let total = sender_batches.len();

        let mut tasks = Vec::with_capacity(total);
        for (sender, positions) in sender_batches {
            if cancel.is_cancelled() {
                break;
            }

            let processor = self.clone();
            let records = Arc::clone(&records);
            let token = cancel.clone();
            let task = tokio::spawn(async move {
                if token.is_cancelled() {
                    return Ok(None);
                }
                processor
                    .process_sender(&sender, &records, &positions)
                    .map(Some)
            });
            tasks.push(task);
        }

        let mut results = Vec::with_capacity(total);
        let mut first_error = None;
        for task in tasks {
            match task.await {
                Ok(Ok(Some(result))) => results.push(result),
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    error!(error = %e, "sender task failed");
                    first_error.get_or_insert(DetectionError::runtime(format!(
                        "sender task failed: {}",
                        e
                    )));
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        if results.len() < total {
            return Err(DetectionError::Cancelled {
                completed: results.len(),
                total,
            });
        }

        debug!(senders = total, "batch processed");
        Ok(results)
    }
}
