//! AML Screening Engine Library
//!
//! # Overview
//!
//! Batch screening of financial transactions for anti-money-laundering risk
//! indicators. Every record is checked against three rules and annotated
//! with one flag per rule plus their union:
//!
//! - **Large Transaction**: amount strictly above the threshold
//! - **High-Risk Country**: country is in the configured set
//! - **Structuring**: the record lies in a time window (per sender) holding
//!   more than one transaction whose amounts sum above the threshold
//!
//! # Architecture
//!
//! - [`types`] - Records, batches, flags, configuration and errors
//! - [`core`] - Rule evaluation, the structuring sweep, flag combination,
//!   summaries and the sync/async detection engines
//! - [`io`] - CSV ingestion, flagged-row output and summary reports
//! - [`strategy`] - Complete pipelines selectable at runtime
//! - [`cli`] - CLI argument parsing
//!
//! # Example
//!
//! ```
//! use aml_screening_engine::{DetectionEngine, TransactionBatch, TransactionRecord};
//! use chrono::{TimeZone, Utc};
//! use rust_decimal::Decimal;
//!
//! let ts = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
//! let record = TransactionRecord::new("T1", "S1", ts, Decimal::new(15000, 0), "France").unwrap();
//! let batch = TransactionBatch::from_records(vec![record]).unwrap();
//!
//! let result = DetectionEngine::default().detect(batch).unwrap();
//! assert!(result.flags_for("T1").unwrap().large_tx());
//! ```

pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{AsyncDetectionEngine, DetectionEngine, SummaryStats};
pub use io::write_detection_csv;
pub use types::{
    DetectionError, DetectionResult, FlagSet, RuleConfig, SenderId, TransactionBatch,
    TransactionId, TransactionRecord,
};
