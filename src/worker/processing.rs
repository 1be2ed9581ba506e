//! Processing phase: render one batch of items and persist the cursor

use crate::config::WorkerConfig;
use crate::db::models::BatchJob;
use crate::db::{items, jobs, DbPool};
use crate::error::Result;
use crate::render;
use crate::storage::{artifact_key, ObjectStore};
use tracing::{info, warn};

/// A render function: canonical content string → PNG bytes.
///
/// Injected so tests can fail individual items; production passes
/// [`render::code_png`].
pub type RenderFn = dyn Fn(&str) -> Result<Vec<u8>> + Send + Sync;

/// What one processing invocation did
#[derive(Debug)]
pub struct ProcessingReport {
    pub fetched: usize,
    pub succeeded: i32,
    pub processed: i32,
    pub finished: bool,
}

impl ProcessingReport {
    pub fn message(&self, total: i32) -> String {
        if self.finished {
            format!("processed {}/{}, moving to zipping", self.processed, total)
        } else {
            format!("processed {}/{}", self.processed, total)
        }
    }
}

/// Advance a claimed `processing` job by one batch.
///
/// Fetches up to `batch_size` items past the cursor, renders and stores each,
/// and persists the result. Per-item failures are logged and skipped; only a
/// database error aborts the invocation.
pub async fn run(
    pool: &DbPool,
    store: &dyn ObjectStore,
    config: &WorkerConfig,
    job: &BatchJob,
    render_fn: &RenderFn,
) -> Result<ProcessingReport> {
    let cursor = job.last_processed_id.unwrap_or(0);
    let batch = items::fetch_page(pool, job.id, cursor, config.batch_size).await?;

    let mut successes: i32 = 0;
    let mut last_seen = job.last_processed_id;

    for item in &batch {
        let url = render::canonical_url(&config.code_url_template, &item.token);

        let png = match render_fn(&url) {
            Ok(png) => png,
            Err(e) => {
                warn!(job_id = job.id, token = %item.token, error = %e, "render failed, skipping item");
                continue;
            }
        };

        let key = artifact_key(&item.campaign_id, job.id, &item.token);
        if let Err(e) = store.put(&key, png).await {
            warn!(job_id = job.id, token = %item.token, error = %e, "store failed, skipping item");
            continue;
        }

        successes += 1;
        last_seen = Some(item.id);
    }

    let processed = (job.processed + successes).min(job.total);
    let finished = phase_finished(batch.len(), processed, job.total);

    if finished {
        jobs::mark_zipping(pool, job.id, processed, last_seen).await?;
        info!(job_id = job.id, processed, total = job.total, "batch done, job moved to zipping");
    } else {
        jobs::record_progress(pool, job.id, processed, last_seen).await?;
        info!(job_id = job.id, processed, total = job.total, "batch done, job stays processing");
    }

    Ok(ProcessingReport {
        fetched: batch.len(),
        succeeded: successes,
        processed,
        finished,
    })
}

/// Decide whether a batch result completes the processing phase.
///
/// Exposed separately so the boundary (`processed == total` exactly) is
/// unit-testable without a database.
pub fn phase_finished(fetched: usize, processed: i32, total: i32) -> bool {
    fetched == 0 || processed >= total
}
