//! Flag combination and result assembly
//!
//! Static flags and structuring hits are produced by independent stages; the
//! combiner unions them into one immutable [`FlagSet`] per record and lays
//! the records back out in ingestion order.

use crate::types::{
    DetectionError, DetectionResult, FlagSet, FlaggedTransaction, StaticFlags, TransactionId,
    TransactionRecord,
};
use std::collections::{HashMap, HashSet};

/// Union static rule outcomes and structuring hits for every record
///
/// `static_flags[i]` must belong to `records[i]`.
pub fn combine(
    columns: Vec<String>,
    records: Vec<TransactionRecord>,
    static_flags: &[StaticFlags],
    structuring: &HashSet<TransactionId>,
) -> Result<DetectionResult, DetectionError> {
    if records.len() != static_flags.len() {
        return Err(DetectionError::runtime(format!(
            "static flags cover {} of {} records",
            static_flags.len(),
            records.len()
        )));
    }

    let entries = records
        .into_iter()
        .zip(static_flags)
        .map(|(record, static_flags)| {
            let flags = FlagSet::combine(*static_flags, structuring.contains(record.id()));
            FlaggedTransaction { record, flags }
        })
        .collect();

    DetectionResult::new(columns, entries)
}

/// Attach per-id flag sets computed out of order back onto records
///
/// # Errors
///
/// Returns a `Runtime` error if any record has no flag set, which means a
/// sender's work never completed.
pub fn assemble(
    columns: Vec<String>,
    records: Vec<TransactionRecord>,
    mut flags: HashMap<TransactionId, FlagSet>,
) -> Result<DetectionResult, DetectionError> {
    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        let flag_set = flags.remove(record.id()).ok_or_else(|| {
            DetectionError::runtime(format!("no flags computed for transaction '{}'", record.id()))
        })?;
        entries.push(FlaggedTransaction {
            record,
            flags: flag_set,
        });
    }

    DetectionResult::new(columns, entries)
}
