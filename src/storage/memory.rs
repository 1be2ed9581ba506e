//! In-memory object-store backend for tests and local development

use crate::error::{Result, WorkerError};
use crate::storage::ObjectStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::Mutex;

/// In-memory key/value blob store
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.objects.lock().await.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.objects.lock().await.get(key).cloned())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn put_streamed(
        &self,
        key: &str,
        mut body: Box<dyn AsyncRead + Send + Unpin + 'static>,
    ) -> Result<()> {
        let mut bytes = Vec::new();
        body.read_to_end(&mut bytes)
            .await
            .map_err(|e| WorkerError::Storage(e.to_string()))?;
        self.put(key, bytes).await
    }

    async fn presign_download(&self, key: &str, expires: Duration) -> Result<String> {
        Ok(format!("memory://{}?expires={}", key, expires.as_secs()))
    }
}
