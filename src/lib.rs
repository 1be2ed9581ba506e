//! Artifact Worker - a crash-resilient batch pipeline for campaign code images
//!
//! Turns a "generate N identifiers for campaign X" job into N rendered PNG
//! artifacts in object storage plus one downloadable archive with a manifest.
//! An external scheduler triggers the worker repeatedly; each invocation
//! atomically claims one job and advances it by a single bounded unit of work
//! (one processing batch, or the whole zipping pass), so large jobs complete
//! across many invocations and a killed invocation never corrupts state.

pub mod archive;
pub mod config;
pub mod db;
pub mod error;
pub mod render;
pub mod server;
pub mod storage;
pub mod worker;

pub use config::WorkerConfig;
pub use error::{Result, WorkerError};
pub use storage::{MemoryStore, ObjectStore, S3Store};
pub use worker::{JobRunner, Outcome};
