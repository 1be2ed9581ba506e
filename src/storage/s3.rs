//! S3 object-store backend
//!
//! Blob reads and writes go through the AWS SDK; the streaming archive
//! upload goes through a presigned PUT URL so the HTTP body can be fed
//! directly from the archive encoder.

use crate::error::{Result, WorkerError};
use crate::storage::ObjectStore;
use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

/// How long a presigned upload target stays valid. Uploads start immediately,
/// so this only needs to outlive one zipping invocation.
const UPLOAD_URL_TTL: Duration = Duration::from_secs(3600);

/// S3 storage backend
pub struct S3Store {
    client: S3Client,
    bucket: String,
    http: reqwest::Client,
}

impl S3Store {
    /// Create a new S3 storage backend
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self {
            client,
            bucket,
            http: reqwest::Client::new(),
        }
    }

    /// Mint a presigned PUT URL for an upload destination
    pub async fn presign_upload(&self, key: &str) -> Result<String> {
        let presigning = PresigningConfig::expires_in(UPLOAD_URL_TTL)
            .map_err(|e| WorkerError::Storage(e.to_string()))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| WorkerError::Storage(e.to_string()))?;

        Ok(request.uri().to_string())
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type_for(key))
            .send()
            .await
            .map_err(|e| {
                WorkerError::Storage(format!("put s3://{}/{}: {}", self.bucket, key, e))
            })?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let response = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .map(|e| e.is_no_such_key())
                    .unwrap_or(false);
                if missing {
                    return Ok(None);
                }
                return Err(WorkerError::Storage(format!(
                    "get s3://{}/{}: {}",
                    self.bucket, key, err
                )));
            }
        };

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| WorkerError::Storage(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(Some(data))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let response = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| {
                    WorkerError::Storage(format!("list s3://{}/{}: {}", self.bucket, prefix, e))
                })?;

            keys.extend(
                response
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(String::from)),
            );

            match response.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }

        Ok(keys)
    }

    async fn put_streamed(
        &self,
        key: &str,
        body: Box<dyn AsyncRead + Send + Unpin + 'static>,
    ) -> Result<()> {
        let url = self.presign_upload(key).await?;

        let response = self
            .http
            .put(&url)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(body)))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WorkerError::UploadRejected(response.status().as_u16()));
        }

        Ok(())
    }

    async fn presign_download(&self, key: &str, expires: Duration) -> Result<String> {
        let presigning = PresigningConfig::expires_in(expires)
            .map_err(|e| WorkerError::Storage(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| WorkerError::Storage(e.to_string()))?;

        Ok(request.uri().to_string())
    }
}

fn content_type_for(key: &str) -> &'static str {
    if key.ends_with(".png") {
        "image/png"
    } else if key.ends_with(".zip") {
        "application/zip"
    } else {
        "application/octet-stream"
    }
}
