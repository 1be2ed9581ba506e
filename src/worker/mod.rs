//! Worker module: job selection, claiming, and the two execution phases
//!
//! This module provides:
//! - JobRunner: one-invocation orchestrator (select → claim → phase)
//! - processing: render a batch of items and advance the cursor
//! - zipping: stream all images plus a manifest into one uploaded archive

pub mod processing;
pub mod runner;
pub mod zipping;

pub use processing::ProcessingReport;
pub use runner::{JobRunner, Outcome};
pub use zipping::ZippingReport;
