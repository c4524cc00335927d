//! High-level pipeline: mirror one directory-index tree into the bucket.
//!
//! This module owns the pairing of the source root URL with the destination
//! root prefix and runs exactly one traversal per call.
//!
//! # Responsibilities
//! - Validate the root pairing before any network traffic
//! - Drive the [`Walker`] over the whole tree
//! - Hand back a [`SynchroniseReport`] with every uploaded key and every
//!   failure, so callers can decide on an exit status
//!
//! # Error Handling
//! Only configuration problems are returned as `Err`. Fetch, integrity and
//! storage failures are per folder or per file and end up in the report.
//!
//! # Navigation
//! - Main entrypoint: [`synchronise`]
//! - Lower-level control (pinned year for the month rewrite): [`synchronise_with`]

use reqwest::{Client, Url};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::SyncConfig;
use crate::contract::ObjectStore;
use crate::error::SyncError;
use crate::walker::{FailureReport, WalkReport, Walker};

#[derive(Debug, Clone, Serialize)]
pub struct SynchroniseReport {
    pub root_url: String,
    pub destination_prefix: String,
    pub uploaded: Vec<String>,
    pub failures: Vec<FailureReport>,
    pub folders_visited: usize,
}

impl SynchroniseReport {
    fn from_walk(config: &SyncConfig, walk: WalkReport) -> Self {
        Self {
            root_url: config.root_url.clone(),
            destination_prefix: config.destination_prefix.clone(),
            uploaded: walk.uploaded,
            failures: walk.failures,
            folders_visited: walk.folders_visited,
        }
    }

    /// True when nothing failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Runs one full traversal, rewriting month folders with the current year.
pub async fn synchronise<S>(
    config: &SyncConfig,
    client: &Client,
    store: &S,
) -> Result<SynchroniseReport, SyncError>
where
    S: ObjectStore,
{
    synchronise_with(config, client, store, None).await
}

/// As [`synchronise`], optionally pinning the rewrite year.
pub async fn synchronise_with<S>(
    config: &SyncConfig,
    client: &Client,
    store: &S,
    year: Option<i32>,
) -> Result<SynchroniseReport, SyncError>
where
    S: ObjectStore,
{
    validate(config)?;
    config.trace_loaded();
    info!(root_url = %config.root_url, "[SYNC] Starting full synchronisation");

    let mut walker = Walker::new(client.clone(), store, config.clone());
    if let Some(year) = year {
        walker = walker.with_year(year);
    }
    let walk = walker
        .walk(&config.root_url, &config.destination_prefix)
        .await;
    let report = SynchroniseReport::from_walk(config, walk);

    match serde_json::to_string_pretty(&report) {
        Ok(json) => debug!(json = %json, "[SYNC][DEBUG] Synchronise report as JSON"),
        Err(e) => error!(error = ?e, "[SYNC][DEBUG] Failed to serialize report as JSON"),
    }
    if report.is_complete() {
        info!(uploaded = report.uploaded.len(), "[SYNC] Synchronisation complete");
    } else {
        error!(
            uploaded = report.uploaded.len(),
            failures = report.failure_count(),
            "[SYNC][ERROR] Synchronisation finished with failures"
        );
    }
    Ok(report)
}

fn validate(config: &SyncConfig) -> Result<(), SyncError> {
    let url = Url::parse(&config.root_url).map_err(|e| {
        SyncError::Configuration(format!("root_url {:?} is not a valid URL: {e}", config.root_url))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SyncError::Configuration(format!(
            "root_url must be http or https, got {:?}",
            url.scheme()
        )));
    }
    if config.image_extensions.as_slice().is_empty() {
        return Err(SyncError::Configuration(
            "image_extensions must not be empty".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_relative_root_url() {
        let config = SyncConfig::new("uploads/2024", "dest/");
        assert!(matches!(validate(&config), Err(SyncError::Configuration(_))));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let config = SyncConfig::new("ftp://example.com/2024/", "dest/");
        assert!(matches!(validate(&config), Err(SyncError::Configuration(_))));
    }

    #[test]
    fn accepts_http_root() {
        let config = SyncConfig::new("https://example.com/uploads/2024", "dest/");
        assert!(validate(&config).is_ok());
    }
}
