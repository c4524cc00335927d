///
/// Command surface for the image-bucket binary: argument parsing, subcommand
/// routing and the human-readable run summary.
///
/// Traversal, path rewriting and transfer all live in [`image-bucket-core`];
/// this module only assembles the HTTP client and object store from config
/// and hands them over.
///
/// ## How To Use
/// - From a shell: `image-bucket sync --config image-bucket.yaml`, or
///   `image-bucket schedule` to keep running and sync once a day.
/// - From tests: build a [`Cli`] and await [`run`].
///
/// [`image-bucket-core`]: ../../image-bucket-core/
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use image_bucket_core::error::FailureStage;
use image_bucket_core::synchronise::{synchronise, SynchroniseReport};

use crate::load_config::{load_config, AppConfig, DEFAULT_CONFIG_PATH};
use crate::schedule::run_daily;
use crate::upload::S3Store;

/// CLI for image-bucket: mirror a web image archive into a bucket.
#[derive(Parser)]
#[clap(
    name = "image-bucket",
    version,
    about = "Mirror an HTML directory listing of images into an S3-compatible bucket"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one full synchronisation and exit
    Sync {
        /// Path to the YAML config file
        #[clap(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
    /// Stay running and synchronise once a day at `schedule.daily_at`
    Schedule {
        /// Path to the YAML config file
        #[clap(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

/// Async CLI entrypoint shared by `main` and the integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Sync { config } => {
            let config = load_config(config)?;
            tracing::info!(command = "sync", "Starting synchronisation process");
            sync_once(&config).await.map(|_| ())
        }
        Commands::Schedule { config } => {
            let config = load_config(config)?;
            tracing::info!(command = "schedule", daily_at = %config.daily_at, "Starting daily schedule");
            let config = &config;
            run_daily(config.daily_at, || async move { sync_once(config).await.map(|_| ()) }).await
        }
    }
}

/// One traversal with a freshly built client and store.
///
/// Fails when the run recorded any failure, after the summary is printed.
pub async fn sync_once(config: &AppConfig) -> Result<SynchroniseReport> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("image-bucket/", env!("CARGO_PKG_VERSION")))
        .timeout(config.http_timeout)
        .build()?;
    let store = S3Store::new(&config.storage);

    let report = match synchronise(&config.sync, &client, &store).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(command = "sync", error = %e, "Synchronisation failed");
            return Err(e.into());
        }
    };

    println!("{}", render_summary(&report, store.bucket()));
    if !report.is_complete() {
        anyhow::bail!(failure_message(&report));
    }
    tracing::info!(command = "sync", uploaded = report.uploaded.len(), "Synchronisation complete");
    Ok(report)
}

/// Folder and file failures are counted separately; a folder failure
/// abandons its whole subtree.
pub fn failure_message(report: &SynchroniseReport) -> String {
    let folders = report
        .failures
        .iter()
        .filter(|f| f.stage == FailureStage::Index)
        .count();
    let files = report.failure_count() - folders;
    format!(
        "synchronisation recorded {} failures ({folders} folders, {files} files); {} files uploaded",
        report.failure_count(),
        report.uploaded.len()
    )
}

pub fn render_summary(report: &SynchroniseReport, bucket: &str) -> String {
    let mut out = format!(
        "Synchronised {} -> s3://{}/{}\n  folders visited: {}\n  uploaded: {}\n  failed: {}",
        report.root_url,
        bucket,
        report.destination_prefix.trim_start_matches('/'),
        report.folders_visited,
        report.uploaded.len(),
        report.failure_count(),
    );
    for failure in &report.failures {
        out.push_str(&format!(
            "\n    [{:?}] {}: {}",
            failure.stage, failure.source_url, failure.message
        ));
    }
    out
}
