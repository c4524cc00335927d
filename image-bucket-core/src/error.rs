use serde::Serialize;
use thiserror::Error;

/// Boxed error returned across the object-store seam, matching the shape
/// real clients and mocks both produce.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can go wrong while mirroring the archive.
///
/// Only [`SyncError::Configuration`] aborts a run. Every other kind is
/// recorded against the folder or file it belongs to and the traversal
/// carries on with the next sibling.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("failed to fetch index page {url}: {source}")]
    IndexFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch file {url}: {reason}")]
    FileFetch { url: String, reason: String },

    #[error("integrity check failed for {url}: {reason}")]
    Integrity { url: String, reason: String },

    #[error("failed to write s3 object {key}: {source}")]
    StorageWrite {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("temporary buffer error: {0}")]
    Io(#[from] std::io::Error),
}

/// The pipeline step a failure is attributed to in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Index,
    Fetch,
    Integrity,
    Storage,
    Configuration,
}

impl SyncError {
    pub fn stage(&self) -> FailureStage {
        match self {
            SyncError::IndexFetch { .. } => FailureStage::Index,
            SyncError::FileFetch { .. } | SyncError::Io(_) => FailureStage::Fetch,
            SyncError::Integrity { .. } => FailureStage::Integrity,
            SyncError::StorageWrite { .. } => FailureStage::Storage,
            SyncError::Configuration(_) => FailureStage::Configuration,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
