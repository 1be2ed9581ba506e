//! Object storage: key derivation, the store trait, and backends

pub mod memory;
pub mod s3;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::AsyncRead;

pub use memory::MemoryStore;
pub use s3::S3Store;

/// Deterministic object key for one rendered code image.
///
/// Overwrite-safe: re-processing a page rewrites the same keys.
pub fn artifact_key(campaign_id: &str, job_id: i64, token: &str) -> String {
    format!("{}/{}/{}.png", campaign_id, job_id, token)
}

/// Object key for a job's final archive.
pub fn archive_key(campaign_id: &str, job_id: i64) -> String {
    format!("{}/{}.zip", campaign_id, job_id)
}

/// The object-store operations the worker needs.
///
/// Backed by S3 in production and an in-memory map in tests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a blob at a key, overwriting any existing object
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()>;

    /// Fetch a blob; `None` when the key does not exist
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// List keys under a prefix
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Store a blob from a byte stream.
    ///
    /// The backend consumes the reader while the producer is still writing,
    /// so an archive can be encoded and uploaded concurrently without ever
    /// buffering in full.
    async fn put_streamed(
        &self,
        key: &str,
        body: Box<dyn AsyncRead + Send + Unpin + 'static>,
    ) -> Result<()>;

    /// Mint a time-limited signed download URL for an object
    async fn presign_download(&self, key: &str, expires: Duration) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_key_pattern() {
        assert_eq!(artifact_key("camp-7", 42, "T1"), "camp-7/42/T1.png");
    }

    #[test]
    fn test_archive_key_pattern() {
        assert_eq!(archive_key("camp-7", 42), "camp-7/42.zip");
    }
}
