//! Asynchronous implementations of core components
//!
//! This module provides the concurrent detection path. Senders are the unit
//! of parallelism: each sender's rules run in their own tokio task and
//! publish into a shared `DashMap`.
//!
//! - **BatchProcessor**: sender partitioning, task spawning, cancellation
//! - **AsyncDetectionEngine**: orchestrates an async run and assembles the result

pub mod batch_processor;
pub mod engine;

pub use batch_processor::{BatchProcessor, SenderResult};
pub use engine::AsyncDetectionEngine;
