//! Job runner: one invocation advances at most one job by one unit of work

use crate::config::WorkerConfig;
use crate::db::models::JobStatus;
use crate::db::{jobs, DbPool};
use crate::error::{Result, WorkerError};
use crate::render;
use crate::storage::ObjectStore;
use crate::worker::{processing, zipping};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a single worker invocation
#[derive(Debug)]
pub enum Outcome {
    /// No eligible job, or another invocation won the claim race
    Idle,
    /// One job was advanced by one bounded unit of work
    Progressed { job_id: i64, message: String },
}

/// The orchestrator: selects, claims, and advances one job per invocation.
pub struct JobRunner {
    pool: DbPool,
    store: Arc<dyn ObjectStore>,
    config: WorkerConfig,
}

impl JobRunner {
    /// Create a new job runner
    pub fn new(pool: DbPool, store: Arc<dyn ObjectStore>, config: WorkerConfig) -> Self {
        Self {
            pool,
            store,
            config,
        }
    }

    /// Run one invocation: select a job, claim it, execute its current phase.
    ///
    /// Returns [`Outcome::Idle`] when there is nothing to do or the claim was
    /// lost to a concurrent invocation; both are normal, not errors.
    pub async fn run_once(&self) -> Result<Outcome> {
        let candidate = match jobs::select_candidate(&self.pool, self.config.stale_after).await? {
            Some(job) => job,
            None => return Ok(Outcome::Idle),
        };

        if !jobs::claim_job(&self.pool, candidate.id, self.config.stale_after).await? {
            info!(job_id = candidate.id, "claim lost to a concurrent invocation");
            return Ok(Outcome::Idle);
        }

        // Re-read after the claim: a pending candidate is now `processing`.
        let job = jobs::get_job(&self.pool, candidate.id)
            .await?
            .ok_or_else(|| WorkerError::UnknownStatus("claimed job vanished".to_string()))?;

        info!(job_id = job.id, status = %job.status, campaign_id = %job.campaign_id, "claimed job");

        let message = match job.job_status()? {
            JobStatus::Processing => {
                let report = processing::run(
                    &self.pool,
                    self.store.as_ref(),
                    &self.config,
                    &job,
                    &render::code_png,
                )
                .await?;
                report.message(job.total)
            }
            JobStatus::Zipping => {
                let report =
                    zipping::run(&self.pool, Arc::clone(&self.store), &self.config, &job).await?;
                report.message()
            }
            status => {
                // The claim's WHERE clause should make this unreachable.
                warn!(job_id = job.id, status = status.as_str(), "claimed job in unexpected status");
                return Ok(Outcome::Idle);
            }
        };

        Ok(Outcome::Progressed {
            job_id: job.id,
            message,
        })
    }
}
