//! CSV format handling for transaction rows and flagged output
//!
//! This module centralizes all CSV format concerns, providing:
//! - Header validation and required-column lookup (`ColumnLayout`)
//! - Conversion from raw rows to `TransactionRecord`
//! - Flagged-row output serialization
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::types::{
    DetectionError, DetectionResult, TransactionBatch, TransactionId, TransactionRecord,
    REQUIRED_COLUMNS,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::io::Write;
use std::str::FromStr;
use tracing::warn;

/// Flag columns appended to every output row, in order
pub const FLAG_COLUMNS: [&str; 4] = [
    "flag_large_tx",
    "flag_high_risk_country",
    "flag_structuring",
    "suspicious",
];

/// Naive datetime layouts accepted for the `date` column (read as UTC)
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// What to do with a row that fails validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum InvalidRowPolicy {
    /// Fail the whole batch on the first invalid row
    #[default]
    Reject,
    /// Log the row and leave it out of the batch
    Skip,
}

/// Which rows to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowFilter {
    #[default]
    All,
    SuspiciousOnly,
}

/// Positions of the required columns within an input header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    columns: Vec<String>,
    transaction_id: usize,
    sender_id: usize,
    date: usize,
    amount: usize,
    country: usize,
}

impl ColumnLayout {
    /// Locate the required columns in a header row
    ///
    /// # Errors
    ///
    /// Returns a `Schema` error listing every missing required column.
    pub fn from_headers<'a, I>(headers: I) -> Result<Self, DetectionError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let columns: Vec<String> = headers.into_iter().map(str::to_string).collect();
        let position = |name: &str| columns.iter().position(|c| c == name);

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| position(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(DetectionError::schema(&missing));
        }

        // Every lookup below succeeded in the check above
        let find = |name: &str| position(name).unwrap_or_default();
        Ok(ColumnLayout {
            transaction_id: find("transaction_id"),
            sender_id: find("sender_id"),
            date: find("date"),
            amount: find("amount"),
            country: find("country"),
            columns,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Convert one raw row into a validated `TransactionRecord`
///
/// `line` is only used for error context. Both readers reject ragged rows
/// before conversion; the field-count check covers rows built by hand.
///
/// # Errors
///
/// Returns a `Validation` error if the row has the wrong number of fields,
/// a required value is empty, the date does not parse, or the amount is not
/// a non-negative decimal.
pub fn convert_row(
    layout: &ColumnLayout,
    fields: Vec<String>,
    line: Option<u64>,
) -> Result<TransactionRecord, DetectionError> {
    if fields.len() != layout.columns.len() {
        return Err(DetectionError::validation(
            line,
            format!(
                "expected {} fields, found {}",
                layout.columns.len(),
                fields.len()
            ),
        ));
    }

    let required = |idx: usize, name: &str| -> Result<&str, DetectionError> {
        let value = fields[idx].trim();
        if value.is_empty() {
            Err(DetectionError::validation(line, format!("missing {}", name)))
        } else {
            Ok(value)
        }
    };

    let id = required(layout.transaction_id, "transaction_id")?.to_string();
    let sender_id = required(layout.sender_id, "sender_id")?.to_string();
    let country = fields[layout.country].trim().to_string();

    let raw_date = required(layout.date, "date")?;
    let timestamp = parse_timestamp(raw_date).ok_or_else(|| {
        DetectionError::validation(
            line,
            format!("Invalid date '{}' for transaction '{}'", raw_date, id),
        )
    })?;

    let raw_amount = required(layout.amount, "amount")?;
    let amount = parse_amount(raw_amount).ok_or_else(|| {
        DetectionError::validation(
            line,
            format!("Invalid amount '{}' for transaction '{}'", raw_amount, id),
        )
    })?;

    TransactionRecord::with_fields(id, sender_id, timestamp, amount, country, fields).map_err(
        |e| match e {
            DetectionError::Validation { message, .. } => DetectionError::validation(line, message),
            other => other,
        },
    )
}

/// Accumulates converted rows into a batch under an invalid-row policy
///
/// Under `Skip`, a row-level `Validation` error is logged and dropped; any
/// other error always propagates. A repeated transaction id fails the batch
/// regardless of policy, reported at the line of its second occurrence.
#[derive(Debug)]
pub struct RowCollector {
    policy: InvalidRowPolicy,
    records: Vec<TransactionRecord>,
    seen: HashSet<TransactionId>,
}

impl RowCollector {
    pub fn new(policy: InvalidRowPolicy) -> Self {
        RowCollector {
            policy,
            records: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Admit one row read at `line`
    pub fn admit(
        &mut self,
        row: Result<TransactionRecord, DetectionError>,
        line: Option<u64>,
    ) -> Result<(), DetectionError> {
        match row {
            Ok(record) => {
                if !self.seen.insert(record.id().to_string()) {
                    return Err(DetectionError::validation(
                        line,
                        format!("Duplicate transaction id '{}'", record.id()),
                    ));
                }
                self.records.push(record);
                Ok(())
            }
            Err(e @ DetectionError::Validation { .. }) if self.policy == InvalidRowPolicy::Skip => {
                warn!(error = %e, "skipping invalid row");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<TransactionRecord> {
        self.records
    }

    pub fn into_batch(self, columns: Vec<String>) -> Result<TransactionBatch, DetectionError> {
        TransactionBatch::new(columns, self.records)
    }
}

/// Parse an ISO-8601-compatible timestamp as a UTC instant
///
/// Accepts RFC 3339 with an offset, naive date-times (with `T` or a space,
/// with or without seconds and fractional seconds) and plain dates. Naive
/// values are taken as UTC; plain dates as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a non-negative decimal amount
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    let amount = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()?;

    (amount >= Decimal::ZERO).then_some(amount)
}

/// Write detection results as CSV
///
/// Columns are the original input columns followed by [`FLAG_COLUMNS`];
/// rows keep ingestion order and their original values.
pub fn write_detection_csv(
    result: &DetectionResult,
    output: &mut dyn Write,
    filter: RowFilter,
) -> Result<(), DetectionError> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    let header = result
        .columns()
        .iter()
        .map(String::as_str)
        .chain(FLAG_COLUMNS);
    writer.write_record(header)?;

    for entry in result.entries() {
        let flags = entry.flags;
        if filter == RowFilter::SuspiciousOnly && !flags.suspicious() {
            continue;
        }

        let flag_values = [
            flags.large_tx(),
            flags.high_risk_country(),
            flags.structuring(),
            flags.suspicious(),
        ]
        .map(bool_field);

        let row = entry
            .record
            .fields()
            .iter()
            .map(String::as_str)
            .chain(flag_values);
        writer.write_record(row)?;
    }

    writer.flush()?;

    Ok(())
}

fn bool_field(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
