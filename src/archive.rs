//! Streaming zip assembly
//!
//! Entries are encoded straight into any `AsyncWrite` while the consumer is
//! already draining it, so an archive can be uploaded as it is built. The
//! manifest is accumulated in memory (one CSV line per item) and appended as
//! the final entry before the encoder is finalized.

use crate::error::Result;
use async_zip::tokio::write::ZipFileWriter;
use async_zip::{Compression, ZipEntryBuilder};
use chrono::{DateTime, Utc};
use tokio::io::AsyncWrite;

/// Name of the manifest entry inside every archive.
pub const MANIFEST_NAME: &str = "manifest.csv";

const MANIFEST_HEADER: &str = "token,url,campaign_id,created_at\n";

/// Incremental zip builder: image entries plus a trailing manifest.
pub struct ArchiveBuilder<W: AsyncWrite + Unpin> {
    writer: ZipFileWriter<W>,
    manifest: String,
    image_count: u32,
}

impl<W: AsyncWrite + Unpin> ArchiveBuilder<W> {
    /// Start a new archive writing into `sink`
    pub fn new(sink: W) -> Self {
        Self {
            writer: ZipFileWriter::with_tokio(sink),
            manifest: MANIFEST_HEADER.to_string(),
            image_count: 0,
        }
    }

    /// Record one item in the manifest.
    ///
    /// Every item appears here whether or not its image made it into the
    /// archive; the manifest is the authoritative record of the intended
    /// total.
    pub fn manifest_row(
        &mut self,
        token: &str,
        url: &str,
        campaign_id: &str,
        created_at: DateTime<Utc>,
    ) {
        let line = format!(
            "{},{},{},{}\n",
            csv_field(token),
            csv_field(url),
            csv_field(campaign_id),
            csv_field(&created_at.to_rfc3339()),
        );
        self.manifest.push_str(&line);
    }

    /// Append an image entry under a short display name.
    ///
    /// PNG payloads are already compressed, so entries are stored rather
    /// than deflated.
    pub async fn add_image(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let entry = ZipEntryBuilder::new(name.to_string().into(), Compression::Stored);
        self.writer.write_entry_whole(entry, bytes).await?;
        self.image_count += 1;
        Ok(())
    }

    /// Number of image entries appended so far
    pub fn image_count(&self) -> u32 {
        self.image_count
    }

    /// Current manifest content (header plus one line per recorded item)
    pub fn manifest(&self) -> &str {
        &self.manifest
    }

    /// Append the manifest entry and finalize the archive.
    ///
    /// Closing signals end-of-stream to whatever is consuming the sink.
    pub async fn finish(mut self) -> Result<()> {
        let entry = ZipEntryBuilder::new(MANIFEST_NAME.to_string().into(), Compression::Deflate);
        self.writer
            .write_entry_whole(entry, self.manifest.as_bytes())
            .await?;
        self.writer.close().await?;
        Ok(())
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
