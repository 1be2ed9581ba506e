//! Worker configuration

use crate::error::{Result, WorkerError};
use std::time::Duration;

/// Default number of items rendered per processing invocation.
pub const DEFAULT_BATCH_SIZE: i64 = 200;

/// Default number of items re-paged per chunk during the zipping phase.
pub const DEFAULT_ZIP_PAGE_SIZE: i64 = 500;

/// Default heartbeat age after which a `processing` job is presumed abandoned.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(600);

/// Default lifetime of the signed download URL minted on completion.
pub const DEFAULT_DOWNLOAD_TTL: Duration = Duration::from_secs(7 * 24 * 3600);

/// Worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Static shared secret checked against the trigger's bearer token
    pub trigger_secret: String,

    /// Object store bucket holding artifacts and archives
    pub bucket: String,

    /// URL template with a `{token}` placeholder, rendered into each code image
    pub code_url_template: String,

    /// Items fetched per processing invocation
    pub batch_size: i64,

    /// Items fetched per page during the zipping re-scan
    pub zip_page_size: i64,

    /// Heartbeat staleness threshold for reclaiming abandoned jobs
    pub stale_after: Duration,

    /// Lifetime of the signed download URL on the completed job
    pub download_ttl: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            trigger_secret: String::new(),
            bucket: String::new(),
            code_url_template: "https://example.com/c/{token}".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            zip_page_size: DEFAULT_ZIP_PAGE_SIZE,
            stale_after: DEFAULT_STALE_AFTER,
            download_ttl: DEFAULT_DOWNLOAD_TTL,
        }
    }
}

impl WorkerConfig {
    /// Create a new config builder
    pub fn builder() -> WorkerConfigBuilder {
        WorkerConfigBuilder::default()
    }

    /// Load configuration from the environment.
    ///
    /// `WORKER_SECRET` and `ARTIFACT_BUCKET` are required; the numeric knobs
    /// fall back to their defaults when unset.
    pub fn from_env() -> Result<Self> {
        let trigger_secret = require_env("WORKER_SECRET")?;
        let bucket = require_env("ARTIFACT_BUCKET")?;
        let code_url_template = std::env::var("CODE_URL_TEMPLATE")
            .unwrap_or_else(|_| "https://example.com/c/{token}".to_string());

        Ok(Self {
            trigger_secret,
            bucket,
            code_url_template,
            batch_size: env_i64("WORKER_BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
            zip_page_size: env_i64("WORKER_ZIP_PAGE_SIZE", DEFAULT_ZIP_PAGE_SIZE)?,
            stale_after: env_secs("WORKER_STALE_AFTER_SECS", DEFAULT_STALE_AFTER)?,
            download_ttl: env_secs("WORKER_DOWNLOAD_TTL_SECS", DEFAULT_DOWNLOAD_TTL)?,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| WorkerError::Config(format!("{} not set", name)))
}

fn env_i64(name: &str, default: i64) -> Result<i64> {
    match std::env::var(name) {
        Ok(v) => v
            .parse()
            .map_err(|_| WorkerError::Config(format!("{} is not a number: {}", name, v))),
        Err(_) => Ok(default),
    }
}

fn env_secs(name: &str, default: Duration) -> Result<Duration> {
    match std::env::var(name) {
        Ok(v) => v
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| WorkerError::Config(format!("{} is not a number: {}", name, v))),
        Err(_) => Ok(default),
    }
}

/// Builder for WorkerConfig
#[derive(Default)]
pub struct WorkerConfigBuilder {
    config: WorkerConfig,
}

impl WorkerConfigBuilder {
    /// Set the trigger shared secret
    pub fn trigger_secret(mut self, secret: &str) -> Self {
        self.config.trigger_secret = secret.to_string();
        self
    }

    /// Set the artifact bucket
    pub fn bucket(mut self, bucket: &str) -> Self {
        self.config.bucket = bucket.to_string();
        self
    }

    /// Set the code URL template
    pub fn code_url_template(mut self, template: &str) -> Self {
        self.config.code_url_template = template.to_string();
        self
    }

    /// Set the processing batch size
    pub fn batch_size(mut self, size: i64) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Set the zipping page size
    pub fn zip_page_size(mut self, size: i64) -> Self {
        self.config.zip_page_size = size;
        self
    }

    /// Set the staleness threshold
    pub fn stale_after(mut self, duration: Duration) -> Self {
        self.config.stale_after = duration;
        self
    }

    /// Build the config
    pub fn build(self) -> WorkerConfig {
        self.config
    }
}
