//! Transaction-related types for the screening engine
//!
//! This module defines the typed transaction record that replaces a loosely
//! typed table row, and the batch that groups records for one detection run.

use crate::types::DetectionError;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Transaction identifier, unique across a batch
pub type TransactionId = String;

/// Originator identifier used as the structuring grouping key
pub type SenderId = String;

/// Names of the columns every input must provide
pub const REQUIRED_COLUMNS: [&str; 5] = ["transaction_id", "sender_id", "date", "amount", "country"];

/// A single screened transaction
///
/// Immutable once constructed. The typed fields are what the rules read;
/// `fields` holds the full original row (every input column, in input order)
/// so output can reproduce pass-through columns untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    id: TransactionId,
    sender_id: SenderId,
    timestamp: DateTime<Utc>,
    amount: Decimal,
    country: String,
    fields: Vec<String>,
}

impl TransactionRecord {
    /// Create a record with a canonical five-column row
    ///
    /// The row is laid out as [`REQUIRED_COLUMNS`], with the timestamp
    /// rendered as RFC 3339.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error if `amount` is negative.
    pub fn new(
        id: impl Into<TransactionId>,
        sender_id: impl Into<SenderId>,
        timestamp: DateTime<Utc>,
        amount: Decimal,
        country: impl Into<String>,
    ) -> Result<Self, DetectionError> {
        let id = id.into();
        let sender_id = sender_id.into();
        let country = country.into();
        let fields = vec![
            id.clone(),
            sender_id.clone(),
            timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            amount.to_string(),
            country.clone(),
        ];

        Self::with_fields(id, sender_id, timestamp, amount, country, fields)
    }

    /// Create a record that carries its original input row
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error if `amount` is negative.
    pub fn with_fields(
        id: TransactionId,
        sender_id: SenderId,
        timestamp: DateTime<Utc>,
        amount: Decimal,
        country: String,
        fields: Vec<String>,
    ) -> Result<Self, DetectionError> {
        if amount < Decimal::ZERO {
            return Err(DetectionError::validation(
                None,
                format!("Negative amount {} for transaction '{}'", amount, id),
            ));
        }

        Ok(TransactionRecord {
            id,
            sender_id,
            timestamp,
            amount,
            country,
            fields,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// The original row values, in input column order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// One ingested batch: the input column names plus its records
///
/// Record order is ingestion order and is preserved through detection.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBatch {
    columns: Vec<String>,
    records: Vec<TransactionRecord>,
}

impl TransactionBatch {
    /// Create a batch, enforcing unique transaction ids
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error naming the first duplicated id.
    pub fn new(
        columns: Vec<String>,
        records: Vec<TransactionRecord>,
    ) -> Result<Self, DetectionError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id()) {
                return Err(DetectionError::validation(
                    None,
                    format!("Duplicate transaction id '{}'", record.id()),
                ));
            }
        }

        Ok(TransactionBatch { columns, records })
    }

    /// Create a batch of canonically laid out records
    pub fn from_records(records: Vec<TransactionRecord>) -> Result<Self, DetectionError> {
        let columns = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        Self::new(columns, records)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Split into column names and records
    pub fn into_parts(self) -> (Vec<String>, Vec<TransactionRecord>) {
        (self.columns, self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_new_builds_canonical_row() {
        let record =
            TransactionRecord::new("T1", "S1", ts(), Decimal::new(150050, 2), "Iran").unwrap();

        assert_eq!(
            record.fields(),
            &["T1", "S1", "2024-03-01T09:30:00Z", "1500.50", "Iran"]
        );
        assert_eq!(record.id(), "T1");
        assert_eq!(record.sender_id(), "S1");
        assert_eq!(record.amount(), Decimal::new(150050, 2));
        assert_eq!(record.country(), "Iran");
    }

    #[test]
    fn test_negative_amount_rejected() {
        let result = TransactionRecord::new("T1", "S1", ts(), Decimal::new(-1, 0), "Iran");
        assert!(matches!(result, Err(DetectionError::Validation { .. })));
    }

    #[test]
    fn test_zero_amount_accepted() {
        let result = TransactionRecord::new("T1", "S1", ts(), Decimal::ZERO, "Iran");
        assert!(result.is_ok());
    }

    #[test]
    fn test_batch_rejects_duplicate_ids() {
        let a = TransactionRecord::new("T1", "S1", ts(), Decimal::ONE, "Iran").unwrap();
        let b = TransactionRecord::new("T1", "S2", ts(), Decimal::ONE, "Syria").unwrap();

        let err = TransactionBatch::from_records(vec![a, b]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid row: Duplicate transaction id 'T1'");
    }

    #[test]
    fn test_batch_keeps_order_and_columns() {
        let a = TransactionRecord::new("T2", "S1", ts(), Decimal::ONE, "Iran").unwrap();
        let b = TransactionRecord::new("T1", "S1", ts(), Decimal::ONE, "Iran").unwrap();

        let batch = TransactionBatch::from_records(vec![a, b]).unwrap();
        assert_eq!(batch.columns(), &REQUIRED_COLUMNS);
        assert_eq!(batch.records()[0].id(), "T2");
        assert_eq!(batch.records()[1].id(), "T1");
        assert_eq!(batch.len(), 2);
    }
}
