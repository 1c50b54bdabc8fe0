//! Error types for the screening engine
//!
//! This module defines all error types that can occur while ingesting a batch
//! and running detection over it. Every variant is terminal for a run: the
//! engine never surfaces a partial result as success.
//!
//! # Error Categories
//!
//! - **Schema Errors**: required CSV columns are missing
//! - **Validation Errors**: a row cannot be converted into a transaction record
//! - **Configuration Errors**: the rule configuration is invalid
//! - **I/O Errors**: file not found, permission denied, etc.
//! - **Arithmetic Errors**: decimal overflow while aggregating amounts
//! - **Runtime Errors**: cancellation or async runtime failures

use crate::types::transaction::SenderId;
use thiserror::Error;

/// Main error type for the screening engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    /// One or more required columns are absent from the input header
    ///
    /// Raised before any row is read; the engine never starts.
    #[error("Missing required column(s): {}", missing.join(", "))]
    Schema {
        /// Names of the required columns that were not found
        missing: Vec<String>,
    },

    /// A row could not be turned into a valid transaction record
    #[error("Invalid row{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Validation {
        /// Line number of the offending row (if known)
        line: Option<u64>,
        /// Description of the problem
        message: String,
    },

    /// The rule configuration is invalid
    #[error("Invalid configuration: {message}")]
    Config {
        /// Description of the invalid setting
        message: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// Decimal overflow while summing amounts
    #[error("Arithmetic overflow in {operation}{}", sender.as_ref().map(|s| format!(" for sender {}", s)).unwrap_or_default())]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Sender whose transactions were being aggregated (if any)
        sender: Option<SenderId>,
    },

    /// The run was cancelled before every sender was processed
    #[error("Detection cancelled after {completed} of {total} senders")]
    Cancelled {
        /// Senders whose flags were fully computed
        completed: usize,
        /// Senders in the batch
        total: usize,
    },

    /// Async runtime or task failure
    #[error("Runtime error: {message}")]
    Runtime {
        /// Description of the failure
        message: String,
    },
}

impl From<std::io::Error> for DetectionError {
    fn from(error: std::io::Error) -> Self {
        DetectionError::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for DetectionError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        match error.kind() {
            csv::ErrorKind::Io(_) => DetectionError::Io {
                message: error.to_string(),
            },
            _ => DetectionError::Validation {
                line,
                message: error.to_string(),
            },
        }
    }
}

impl From<csv_async::Error> for DetectionError {
    fn from(error: csv_async::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        match error.kind() {
            csv_async::ErrorKind::Io(_) => DetectionError::Io {
                message: error.to_string(),
            },
            _ => DetectionError::Validation {
                line,
                message: error.to_string(),
            },
        }
    }
}

// Helper functions for creating common errors

impl DetectionError {
    /// Create a Schema error from the missing column names
    pub fn schema<S: AsRef<str>>(missing: &[S]) -> Self {
        DetectionError::Schema {
            missing: missing.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    /// Create a Validation error for a specific line
    pub fn validation(line: Option<u64>, message: impl Into<String>) -> Self {
        DetectionError::Validation {
            line,
            message: message.into(),
        }
    }

    /// Create a Config error
    pub fn config(message: impl Into<String>) -> Self {
        DetectionError::Config {
            message: message.into(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, sender: Option<&str>) -> Self {
        DetectionError::ArithmeticOverflow {
            operation: operation.to_string(),
            sender: sender.map(str::to_string),
        }
    }

    /// Create a Runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        DetectionError::Runtime {
            message: message.into(),
        }
    }
}
