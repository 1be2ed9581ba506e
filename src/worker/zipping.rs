//! Zipping phase: stream every stored image plus a manifest into one archive
//!
//! The phase re-pages the job's items from the beginning with its own cursor,
//! independent of where processing stopped, so the manifest always covers
//! 100% of items. Images that processing never produced are omitted from the
//! archive but stay in the manifest. Nothing is persisted until the upload
//! succeeds; a failure leaves the job in `zipping` and the whole phase is
//! retried on a later invocation.

use crate::archive::ArchiveBuilder;
use crate::config::WorkerConfig;
use crate::db::models::BatchJob;
use crate::db::{items, jobs, DbPool};
use crate::error::{Result, WorkerError};
use crate::render;
use crate::storage::{archive_key, artifact_key, ObjectStore};
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Bounded pipe between the archive encoder and the upload body.
const PIPE_BUFFER: usize = 64 * 1024;

/// What one zipping invocation produced
#[derive(Debug)]
pub struct ZippingReport {
    pub listed: u32,
    pub archived: u32,
    pub archive_url: String,
}

impl ZippingReport {
    pub fn message(&self) -> String {
        format!(
            "archived {}/{} images, job completed",
            self.archived, self.listed
        )
    }
}

/// Run the zipping phase for a claimed `zipping` job.
pub async fn run(
    pool: &DbPool,
    store: Arc<dyn ObjectStore>,
    config: &WorkerConfig,
    job: &BatchJob,
) -> Result<ZippingReport> {
    let key = archive_key(&job.campaign_id, job.id);

    // Producer/consumer pipe: the encoder writes one end while the upload
    // drains the other, so peak memory stays bounded by one entry plus the
    // pipe buffer.
    let (zip_side, upload_side) = tokio::io::duplex(PIPE_BUFFER);

    let upload = {
        let store = Arc::clone(&store);
        let key = key.clone();
        tokio::spawn(async move { store.put_streamed(&key, Box::new(upload_side)).await })
    };

    let mut builder = ArchiveBuilder::new(zip_side);
    let listed = match append_entries(pool, store.as_ref(), config, job, &mut builder).await {
        Ok(listed) => listed,
        Err(e) => return Err(abort_upload(upload, e).await),
    };

    let archived = builder.image_count();
    if let Err(e) = builder.finish().await {
        return Err(abort_upload(upload, e).await);
    }

    upload
        .await
        .map_err(|e| WorkerError::Storage(format!("upload task failed: {}", e)))??;

    let archive_url = store.presign_download(&key, config.download_ttl).await?;
    jobs::complete_job(pool, job.id, &archive_url).await?;

    info!(job_id = job.id, listed, archived, "archive uploaded, job completed");

    Ok(ZippingReport {
        listed,
        archived,
        archive_url,
    })
}

/// Re-page all of the job's items into the archive, returning the manifest
/// row count.
async fn append_entries<W>(
    pool: &DbPool,
    store: &dyn ObjectStore,
    config: &WorkerConfig,
    job: &BatchJob,
    builder: &mut ArchiveBuilder<W>,
) -> Result<u32>
where
    W: AsyncWrite + Unpin,
{
    let mut cursor: i64 = 0;
    let mut listed: u32 = 0;

    loop {
        let page = items::fetch_page(pool, job.id, cursor, config.zip_page_size).await?;
        if page.is_empty() {
            break;
        }

        for item in &page {
            let url = render::canonical_url(&config.code_url_template, &item.token);
            builder.manifest_row(&item.token, &url, &item.campaign_id, item.created_at);
            listed += 1;

            let image_key = artifact_key(&item.campaign_id, job.id, &item.token);
            match store.get(&image_key).await? {
                Some(png) => {
                    builder
                        .add_image(&format!("{}.png", item.token), &png)
                        .await?;
                }
                None => {
                    warn!(job_id = job.id, token = %item.token, "image missing, omitted from archive");
                }
            }

            cursor = item.id;
        }
    }

    Ok(listed)
}

/// Tear down the upload consumer after a failed pass.
///
/// The encoder never finalized, so the consumer must not be allowed to read
/// the closing pipe as a clean end-of-body and store a truncated archive at
/// the final key. If the upload itself already failed, its rejection is the
/// error worth surfacing, not the encoder's broken pipe.
async fn abort_upload(upload: JoinHandle<Result<()>>, err: WorkerError) -> WorkerError {
    upload.abort();
    match upload.await {
        Ok(Err(upload_err)) => upload_err,
        _ => err,
    }
}
