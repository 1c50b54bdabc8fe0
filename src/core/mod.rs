//! Core detection logic
//!
//! This module contains the detection pipeline components:
//! - `rules` - Static, per-record rule evaluation
//! - `structuring` - Per-sender structuring window sweep
//! - `combiner` - Flag union and result assembly
//! - `summary` - Summary statistics derived from a result
//! - `engine` - Single-threaded orchestration
//! - `async` - Concurrent orchestration across senders

pub mod r#async;
pub mod combiner;
pub mod engine;
pub mod rules;
pub mod structuring;
pub mod summary;

pub use engine::DetectionEngine;
pub use r#async::{AsyncDetectionEngine, BatchProcessor};
pub use structuring::StructuringDetector;
pub use summary::{CountryCount, RuleCounts, SummaryStats};
