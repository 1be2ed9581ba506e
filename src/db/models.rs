//! Database models for batch jobs and campaign codes

use crate::error::WorkerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// BatchJob - matches batch_jobs table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BatchJob {
    pub id: i64,
    pub campaign_id: String,
    pub status: String,
    pub total: i32,
    pub processed: i32,
    pub last_processed_id: Option<i64>,
    pub archive_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BatchJob {
    /// Parse the raw status column into the state machine enum
    pub fn job_status(&self) -> Result<JobStatus, WorkerError> {
        JobStatus::parse(&self.status)
    }
}

/// Job status state machine: pending → processing → zipping → completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Zipping,
    Completed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Zipping => "zipping",
            JobStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, WorkerError> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "zipping" => Ok(JobStatus::Zipping),
            "completed" => Ok(JobStatus::Completed),
            other => Err(WorkerError::UnknownStatus(other.to_string())),
        }
    }
}

/// CodeItem - matches campaign_codes table
///
/// One row per identifier to render. Created in bulk by the enqueue API
/// before the owning job enters `pending`; never mutated by the worker.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CodeItem {
    pub id: i64,
    pub job_id: i64,
    pub token: String,
    pub campaign_id: String,
    pub created_at: DateTime<Utc>,
}

/// NewCodeItem - for inserting code rows (enqueue-side tooling and tests)
#[derive(Debug, Clone)]
pub struct NewCodeItem {
    pub job_id: i64,
    pub token: String,
    pub campaign_id: String,
}
