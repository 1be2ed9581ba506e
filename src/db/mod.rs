//! Database module: connection pool, models, and per-table operations

pub mod connection;
pub mod items;
pub mod jobs;
pub mod models;

pub use connection::{create_pool, create_pool_from_env, ensure_schema, DbPool};
pub use models::{BatchJob, CodeItem, JobStatus, NewCodeItem};
