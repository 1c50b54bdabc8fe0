//! Detection output types

use crate::core::summary::SummaryStats;
use crate::types::{DetectionError, FlagSet, TransactionRecord};

/// A record paired with its rule outcomes
#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedTransaction {
    pub record: TransactionRecord,
    pub flags: FlagSet,
}

/// Immutable result of one detection run
///
/// Entries are in ingestion order. The summary is derived from the entries
/// at construction and can be recomputed at any time with
/// [`SummaryStats::from_entries`].
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    columns: Vec<String>,
    entries: Vec<FlaggedTransaction>,
    summary: SummaryStats,
}

impl DetectionResult {
    /// Assemble a result and derive its summary
    ///
    /// # Errors
    ///
    /// Returns an `ArithmeticOverflow` error if the total volume overflows.
    pub fn new(
        columns: Vec<String>,
        entries: Vec<FlaggedTransaction>,
    ) -> Result<Self, DetectionError> {
        let summary = SummaryStats::from_entries(&entries)?;

        Ok(DetectionResult {
            columns,
            entries,
            summary,
        })
    }

    /// Input column names (excluding flag columns)
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn entries(&self) -> &[FlaggedTransaction] {
        &self.entries
    }

    pub fn summary(&self) -> &SummaryStats {
        &self.summary
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with `suspicious = true`, in ingestion order
    pub fn suspicious(&self) -> impl Iterator<Item = &FlaggedTransaction> {
        self.entries.iter().filter(|entry| entry.flags.suspicious())
    }

    /// Flags for a transaction id, if present
    pub fn flags_for(&self, id: &str) -> Option<FlagSet> {
        self.entries
            .iter()
            .find(|entry| entry.record.id() == id)
            .map(|entry| entry.flags)
    }
}
