//! Error types for artifact-worker

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown job status: {0}")]
    UnknownStatus(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Object storage error: {0}")]
    Storage(String),

    #[error("Archive encoding error: {0}")]
    Archive(#[from] async_zip::error::ZipError),

    #[error("Archive upload rejected with HTTP {0}")]
    UploadRejected(u16),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, WorkerError>;
