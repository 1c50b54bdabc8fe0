//! I/O module
//!
//! Handles CSV parsing, flagged output and summary reporting.
//!
//! # Components
//!
//! - `csv_format` - Header validation, row conversion, output serialization
//! - `sync_reader` - Synchronous CSV reader with iterator interface
//! - `async_reader` - Asynchronous CSV reader with chunked reads
//! - `report` - Narrative and JSON summaries

pub mod async_reader;
pub mod csv_format;
pub mod report;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{
    convert_row, write_detection_csv, ColumnLayout, InvalidRowPolicy, RowCollector, RowFilter,
    FLAG_COLUMNS,
};
pub use sync_reader::SyncReader;
