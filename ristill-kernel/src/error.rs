//! Kernel error types.

use ristill_api::RecordId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GalleryError {
    /// The dataset is structurally invalid. Fatal at load time.
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("material not found: {0}")]
    NotFound(RecordId),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
