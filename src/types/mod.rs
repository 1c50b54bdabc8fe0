//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `transaction`: Transaction records, batches and identifiers
//! - `config`: Validated rule configuration
//! - `flags`: Per-record rule outcomes
//! - `result`: Detection output
//! - `error`: Error types for the screening engine

pub mod config;
pub mod error;
pub mod flags;
pub mod result;
pub mod transaction;

pub use config::{RuleConfig, RuleConfigFile, RuleOverrides};
pub use error::DetectionError;
pub use flags::{FlagSet, Rule, StaticFlags};
pub use result::{DetectionResult, FlaggedTransaction};
pub use transaction::{
    SenderId, TransactionBatch, TransactionId, TransactionRecord, REQUIRED_COLUMNS,
};
