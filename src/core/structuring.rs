//! Structuring window detection
//!
//! Finds runs of transactions from one sender that together exceed the
//! large-transaction threshold inside a rolling time window.
//!
//! # Window semantics
//!
//! Every transaction `t` of a sender is a candidate window start. Its window
//! is the closed interval `[t.timestamp, t.timestamp + window]`, and contains
//! every transaction of the same sender whose timestamp falls inside it,
//! including `t`, ties at the start, and ties at the upper bound. When a
//! window holds more than one transaction and its amounts sum to more than
//! the threshold, every transaction in it is flagged. A record is flagged if
//! any window containing it qualifies, even if its own window does not.
//!
//! # Algorithm
//!
//! Each sender is swept independently:
//!
//! 1. Sort the sender's transactions by timestamp (O(n log n)).
//! 2. Walk candidate starts in order with a trailing and a leading pointer
//!    and a running sum. Before testing a start, the trailing pointer evicts
//!    transactions strictly earlier than the start, and the leading pointer
//!    admits transactions up to `start + window`.
//! 3. Both pointers only move forward, and qualifying ranges are marked
//!    only past the end of the previously marked range, so the sweep is
//!    O(n) after sorting.
//!
//! Hits are collected in a per-sender keyed accumulator and frozen into a set
//! of transaction ids when the sweep completes.

use crate::types::{DetectionError, RuleConfig, TransactionId, TransactionRecord};
use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Mutable-during-sweep flag store for one sender, keyed by transaction id
#[derive(Debug)]
struct SweepAccumulator<'a> {
    flags: HashMap<&'a str, bool>,
}

impl<'a> SweepAccumulator<'a> {
    fn new(transactions: &[&'a TransactionRecord]) -> Self {
        SweepAccumulator {
            flags: transactions.iter().map(|tx| (tx.id(), false)).collect(),
        }
    }

    fn mark(&mut self, id: &'a str) {
        if let Some(flag) = self.flags.get_mut(id) {
            *flag = true;
        }
    }

    fn freeze(self) -> HashSet<TransactionId> {
        self.flags
            .into_iter()
            .filter(|(_, flagged)| *flagged)
            .map(|(id, _)| id.to_string())
            .collect()
    }
}

/// Per-sender two-pointer structuring detector
#[derive(Debug, Clone, PartialEq)]
pub struct StructuringDetector {
    threshold: Decimal,
    window: TimeDelta,
}

impl StructuringDetector {
    pub fn new(config: &RuleConfig) -> Self {
        StructuringDetector {
            threshold: config.large_tx_threshold(),
            window: config.structuring_window(),
        }
    }

    /// Sweep a single sender's transactions
    ///
    /// `transactions` must all belong to `sender`; their order does not
    /// matter. Returns the ids of every transaction that falls inside at
    /// least one qualifying window.
    ///
    /// # Errors
    ///
    /// Returns an `ArithmeticOverflow` error if a window sum overflows.
    pub fn sweep_sender(
        &self,
        sender: &str,
        transactions: &[&TransactionRecord],
    ) -> Result<HashSet<TransactionId>, DetectionError> {
        if transactions.len() < 2 {
            return Ok(HashSet::new());
        }

        let mut sorted = transactions.to_vec();
        sorted.sort_by(|a, b| {
            a.timestamp()
                .cmp(&b.timestamp())
                .then_with(|| a.id().cmp(b.id()))
        });

        let mut accumulator = SweepAccumulator::new(&sorted);
        let mut trailing = 0;
        let mut leading = 0;
        let mut marked_upto = 0;
        let mut window_sum = Decimal::ZERO;
        let mut windows_hit = 0usize;

        for start in 0..sorted.len() {
            let start_ts = sorted[start].timestamp();

            // Ties with the start stay in the window
            while trailing < start && sorted[trailing].timestamp() < start_ts {
                window_sum = window_sum
                    .checked_sub(sorted[trailing].amount())
                    .ok_or_else(|| DetectionError::arithmetic_overflow("window sum", Some(sender)))?;
                trailing += 1;
            }

            let window_end = start_ts.checked_add_signed(self.window);
            while leading < sorted.len() && within_window(sorted[leading].timestamp(), window_end) {
                window_sum = window_sum
                    .checked_add(sorted[leading].amount())
                    .ok_or_else(|| DetectionError::arithmetic_overflow("window sum", Some(sender)))?;
                leading += 1;
            }

            let count = leading - trailing;
            if count > 1 && window_sum > self.threshold {
                windows_hit += 1;
                for tx in &sorted[marked_upto.max(trailing)..leading] {
                    accumulator.mark(tx.id());
                }
                marked_upto = leading;
            }
        }

        let flagged = accumulator.freeze();
        if !flagged.is_empty() {
            debug!(
                sender,
                windows = windows_hit,
                flagged = flagged.len(),
                "structuring detected"
            );
        }

        Ok(flagged)
    }

    /// Sweep every sender in a slice of records
    pub fn detect(
        &self,
        records: &[TransactionRecord],
    ) -> Result<HashSet<TransactionId>, DetectionError> {
        let mut flagged = HashSet::new();
        for (sender, transactions) in group_by_sender(records) {
            flagged.extend(self.sweep_sender(sender, &transactions)?);
        }
        Ok(flagged)
    }
}

/// An unrepresentable window end means the window is unbounded above
fn within_window(timestamp: DateTime<Utc>, window_end: Option<DateTime<Utc>>) -> bool {
    match window_end {
        Some(end) => timestamp <= end,
        None => true,
    }
}

/// Group records by sender, keeping each sender's records in input order
pub fn group_by_sender(records: &[TransactionRecord]) -> HashMap<&str, Vec<&TransactionRecord>> {
    let mut groups: HashMap<&str, Vec<&TransactionRecord>> = HashMap::new();
    for record in records {
        groups.entry(record.sender_id()).or_default().push(record);
    }
    groups
}
