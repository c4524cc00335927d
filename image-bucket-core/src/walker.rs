//! Depth-first traversal of a directory index tree.
//!
//! The walk keeps its own stack of open folders instead of recursing, so a
//! very deep (or accidentally self-referential) listing grows a `Vec` rather
//! than the call stack. Each frame remembers the links it has not yet
//! visited; descending into a folder pushes a frame and finishing its links
//! pops it, which yields exactly the order a recursive walk would.

use std::vec::IntoIter;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::classify::{classify, is_month_token, LinkKind};
use crate::config::SyncConfig;
use crate::contract::ObjectStore;
use crate::error::{FailureStage, SyncError};
use crate::key::{KeyPath, MonthRewrite};
use crate::listing::{extract_links, is_listing_entry, resolve_link};
use crate::transfer::{StreamingUploader, TransferResult};

/// An open folder: where it lives, where it goes, what is left to visit.
struct Frame {
    source_url: String,
    prefix: KeyPath,
    links: IntoIter<String>,
}

/// A folder or file that could not be mirrored.
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub source_url: String,
    pub stage: FailureStage,
    pub message: String,
}

impl FailureReport {
    fn new(source_url: &str, cause: &SyncError) -> Self {
        Self {
            source_url: source_url.to_owned(),
            stage: cause.stage(),
            message: cause.to_string(),
        }
    }
}

/// What one traversal did.
#[derive(Debug, Default, Clone, Serialize)]
pub struct WalkReport {
    /// Destination keys written, in traversal order.
    pub uploaded: Vec<String>,
    pub failures: Vec<FailureReport>,
    /// Index pages fetched successfully.
    pub folders_visited: usize,
}

pub struct Walker<'s, S: ObjectStore> {
    client: Client,
    uploader: StreamingUploader<'s, S>,
    config: SyncConfig,
    rewrite: MonthRewrite,
}

impl<'s, S: ObjectStore> Walker<'s, S> {
    pub fn new(client: Client, store: &'s S, config: SyncConfig) -> Self {
        Self {
            uploader: StreamingUploader::new(client.clone(), store),
            client,
            config,
            rewrite: MonthRewrite::current(),
        }
    }

    /// Pins the year used by the month-folder rewrite.
    pub fn with_year(mut self, year: i32) -> Self {
        self.rewrite = MonthRewrite::for_year(year);
        self
    }

    /// Mirrors the tree rooted at `source_url` under `destination_prefix`.
    pub async fn walk(&self, source_url: &str, destination_prefix: &str) -> WalkReport {
        let mut report = WalkReport::default();
        let mut stack: Vec<Frame> = Vec::new();

        if let Some(root) = self
            .open(source_url, KeyPath::parse(destination_prefix), &mut report)
            .await
        {
            stack.push(root);
        }

        while let Some(frame) = stack.last_mut() {
            let Some(link) = frame.links.next() else {
                stack.pop();
                continue;
            };
            let source_url = frame.source_url.clone();
            let prefix = frame.prefix.clone();

            if !is_listing_entry(&link) {
                debug!(link = %link, "[SYNC] Skipping link outside the listing");
                continue;
            }
            let resolved = resolve_link(&source_url, &link);

            match classify(&link, &self.config.image_extensions) {
                LinkKind::ParentReference | LinkKind::Ignored => {
                    debug!(link = %link, "[SYNC] Skipping link");
                }
                LinkKind::FolderReference => {
                    if self.config.flatten_months && is_month_token(&link) {
                        info!(folder = %resolved, "[SYNC] Skipping month folder (flatten mode)");
                        continue;
                    }
                    let child_prefix = prefix.join(&link);
                    info!(folder = %child_prefix.to_prefix(), "[SYNC] Processing folder");
                    if let Some(child) = self.open(&resolved, child_prefix, &mut report).await {
                        stack.push(child);
                    }
                }
                LinkKind::ImageReference => {
                    let key = self.rewrite.apply(&prefix).join(&link).to_key();
                    match self.uploader.upload(&resolved, &key).await {
                        TransferResult::Success { key } => report.uploaded.push(key),
                        TransferResult::Failure { source_url, cause } => {
                            report.failures.push(FailureReport::new(&source_url, &cause));
                        }
                    }
                }
            }
        }

        info!(
            uploaded = report.uploaded.len(),
            failures = report.failures.len(),
            folders = report.folders_visited,
            "[SYNC] Traversal finished"
        );
        report
    }

    /// Fetches and parses one index page. A failure is recorded and the
    /// subtree abandoned.
    async fn open(&self, source_url: &str, prefix: KeyPath, report: &mut WalkReport) -> Option<Frame> {
        match self.fetch_index(source_url).await {
            Ok(html) => {
                let links = extract_links(&html);
                debug!(source_url, links = links.len(), "[SYNC] Parsed index page");
                report.folders_visited += 1;
                Some(Frame {
                    source_url: source_url.to_owned(),
                    prefix,
                    links: links.into_iter(),
                })
            }
            Err(e) => {
                error!(source_url, error = %e, "[SYNC][ERROR] Abandoning folder");
                report.failures.push(FailureReport::new(source_url, &e));
                None
            }
        }
    }

    async fn fetch_index(&self, source_url: &str) -> Result<String, SyncError> {
        let index_error = |source| SyncError::IndexFetch {
            url: source_url.to_owned(),
            source,
        };
        self.client
            .get(source_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(index_error)?
            .text()
            .await
            .map_err(index_error)
    }
}
