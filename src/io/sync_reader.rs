//! Synchronous CSV reader with iterator interface
//!
//! Streams transaction rows from a CSV source, validating the header once up
//! front and converting each row through the csv_format module.
//!
//! ```no_run
//! use aml_screening_engine::io::sync_reader::SyncReader;
//! use aml_screening_engine::io::InvalidRowPolicy;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("transactions.csv")).unwrap();
//! let batch = reader.read_batch(InvalidRowPolicy::Reject).unwrap();
//! println!("Loaded {} transactions", batch.len());
//! ```
//!
//! # Error Handling
//!
//! - Missing files and missing required columns are returned from `new()`
//! - Individual row errors are yielded as `Err` items, carrying the line number

use crate::io::csv_format::{convert_row, ColumnLayout, InvalidRowPolicy, RowCollector};
use crate::types::{DetectionError, TransactionBatch, TransactionRecord};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Synchronous CSV reader
#[derive(Debug)]
pub struct SyncReader<R: Read = File> {
    reader: csv::Reader<R>,
    layout: ColumnLayout,
    record: StringRecord,
}

impl SyncReader<File> {
    /// Open a CSV file and validate its header
    pub fn new(path: &Path) -> Result<Self, DetectionError> {
        let file = File::open(path).map_err(|e| DetectionError::Io {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        })?;

        Self::from_reader(file)
    }
}

impl<R: Read> SyncReader<R> {
    /// Wrap any byte source and validate its header
    ///
    /// Fields are trimmed; every row must have as many fields as the header.
    pub fn from_reader(source: R) -> Result<Self, DetectionError> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .buffer_capacity(8 * 1024)
            .from_reader(source);

        let layout = ColumnLayout::from_headers(reader.headers()?.iter())?;

        Ok(Self {
            reader,
            layout,
            record: StringRecord::new(),
        })
    }

    /// Input column names, in input order
    pub fn columns(&self) -> &[String] {
        self.layout.columns()
    }

    /// Drain the reader into one batch
    ///
    /// # Errors
    ///
    /// Under `Reject`, the first invalid row fails the batch. Duplicate
    /// transaction ids always fail it.
    pub fn read_batch(
        mut self,
        policy: InvalidRowPolicy,
    ) -> Result<TransactionBatch, DetectionError> {
        let mut collector = RowCollector::new(policy);

        while let Some((line, row)) = self.next_row() {
            collector.admit(row, line)?;
        }

        collector.into_batch(self.layout.columns().to_vec())
    }

    /// Read and convert the next row, along with its line number
    fn next_row(&mut self) -> Option<(Option<u64>, Result<TransactionRecord, DetectionError>)> {
        match self.reader.read_record(&mut self.record) {
            Ok(false) => None,
            Ok(true) => {
                let line = self.record.position().map(|p| p.line());
                let fields = self.record.iter().map(str::to_string).collect();
                Some((line, convert_row(&self.layout, fields, line)))
            }
            Err(e) => {
                let line = e.position().map(|p| p.line());
                Some((line, Err(e.into())))
            }
        }
    }
}

impl<R: Read> Iterator for SyncReader<R> {
    type Item = Result<TransactionRecord, DetectionError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().map(|(_, row)| row)
    }
}
