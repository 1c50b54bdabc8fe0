//! Asynchronous CSV reader with chunked reads
//!
//! Streams transaction rows from any `futures::io::AsyncRead` source in
//! chunks of a configurable size, so a large file is parsed incrementally
//! while the runtime stays responsive.
//!
//! ```text
//! AsyncRead → AsyncReader → chunks of TransactionRecords → TransactionBatch
//!                 ↓
//!          csv_format module
//!          (ColumnLayout, convert_row, RowCollector)
//! ```

use crate::io::csv_format::{convert_row, ColumnLayout, InvalidRowPolicy, RowCollector};
use crate::types::{DetectionError, TransactionBatch, TransactionRecord};
use csv_async::{AsyncReaderBuilder, StringRecord, Trim};
use futures::io::AsyncRead;
use tracing::debug;

/// Asynchronous CSV reader
pub struct AsyncReader<R: AsyncRead + Unpin> {
    reader: csv_async::AsyncReader<R>,
    layout: ColumnLayout,
    record: StringRecord,
    exhausted: bool,
}

impl<R: AsyncRead + Unpin + Send> AsyncReader<R> {
    /// Wrap an async byte source and validate its header
    pub async fn new(source: R) -> Result<Self, DetectionError> {
        let mut reader = AsyncReaderBuilder::new()
            .trim(Trim::All)
            .create_reader(source);

        let layout = ColumnLayout::from_headers(reader.headers().await?.iter())?;

        Ok(Self {
            reader,
            layout,
            record: StringRecord::new(),
            exhausted: false,
        })
    }

    /// Input column names, in input order
    pub fn columns(&self) -> &[String] {
        self.layout.columns()
    }

    /// Read up to `chunk_size` rows
    ///
    /// Returns fewer rows than requested at end of input, or when invalid
    /// rows were skipped. Duplicate ids are only detected within the chunk.
    pub async fn read_chunk(
        &mut self,
        chunk_size: usize,
        policy: InvalidRowPolicy,
    ) -> Result<Vec<TransactionRecord>, DetectionError> {
        let mut collector = RowCollector::new(policy);
        self.fill(chunk_size, &mut collector).await?;

        Ok(collector.into_records())
    }

    /// Drain the reader into one batch, `chunk_size` rows at a time
    pub async fn read_batch(
        mut self,
        chunk_size: usize,
        policy: InvalidRowPolicy,
    ) -> Result<TransactionBatch, DetectionError> {
        let chunk_size = chunk_size.max(1);
        let mut collector = RowCollector::new(policy);
        let mut chunks = 0usize;

        while !self.exhausted {
            self.fill(chunk_size, &mut collector).await?;
            chunks += 1;
        }

        debug!(chunks, records = collector.len(), "async read complete");
        collector.into_batch(self.layout.columns().to_vec())
    }

    /// Consume up to `chunk_size` rows into `collector`
    ///
    /// Rows csv-async itself rejects (ragged, invalid UTF-8) count as
    /// consumed and go through the policy like any other invalid row.
    async fn fill(
        &mut self,
        chunk_size: usize,
        collector: &mut RowCollector,
    ) -> Result<(), DetectionError> {
        let mut consumed = 0;

        while consumed < chunk_size {
            match self.reader.read_record(&mut self.record).await {
                Ok(false) => {
                    self.exhausted = true;
                    break;
                }
                Ok(true) => {
                    let line = self.record.position().map(|p| p.line());
                    let fields = self.record.iter().map(str::to_string).collect();
                    collector.admit(convert_row(&self.layout, fields, line), line)?;
                }
                Err(e) => {
                    let line = e.position().map(|p| p.line());
                    collector.admit(Err(e.into()), line)?;
                }
            }
            consumed += 1;
        }

        Ok(())
    }
}
