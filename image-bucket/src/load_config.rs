/// `load_config` module: loads the static YAML settings and merges in the
/// environment-sourced storage credentials.
///
/// # Responsibilities
/// - Parse the YAML file (source root, destination prefix, flatten mode,
///   extension allow-list, HTTP timeout, daily schedule) into typed structs
/// - Pull bucket, endpoint, region and credentials from the environment
/// - Fail before any network traffic when something required is missing
///
/// # Errors
/// All errors use `anyhow::Error` with the failing path or variable named,
/// and are surfaced at the CLI boundary.
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveTime;
use image_bucket_core::config::SyncConfig;
use serde::Deserialize;
use tracing::{error, info};

use crate::upload::StorageConfig;

pub const DEFAULT_CONFIG_PATH: &str = "image-bucket.yaml";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_DAILY_AT: &str = "00:00";

#[derive(Debug, Deserialize)]
pub struct FileConfig {
    #[serde(flatten)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub http: HttpSection,
    #[serde(default)]
    pub schedule: ScheduleSection,
}

#[derive(Debug, Deserialize)]
pub struct HttpSection {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Deserialize)]
pub struct ScheduleSection {
    /// Local wall-clock time, `HH:MM`.
    #[serde(default = "default_daily_at")]
    pub daily_at: String,
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            daily_at: default_daily_at(),
        }
    }
}

fn default_daily_at() -> String {
    DEFAULT_DAILY_AT.to_owned()
}

/// Fully merged settings for one process.
#[derive(Debug)]
pub struct AppConfig {
    pub sync: SyncConfig,
    pub http_timeout: Duration,
    pub daily_at: NaiveTime,
    pub storage: StorageConfig,
}

/// Reads and validates the YAML file only; no environment access.
pub fn load_file_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let file_config: FileConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if file_config.http.timeout_secs == 0 {
        anyhow::bail!("http.timeout_secs must be greater than zero");
    }
    Ok(file_config)
}

/// Loads the YAML file at `path` and injects the storage settings from the
/// environment. Returns a fully merged [`AppConfig`] or an error.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let file_config = load_file_config(path)?;

    let daily_at = parse_daily_at(&file_config.schedule.daily_at)?;
    let storage = StorageConfig::from_env()?;

    info!(
        root_url = %file_config.sync.root_url,
        bucket = %storage.bucket,
        %daily_at,
        "Config loaded and merged successfully"
    );

    Ok(AppConfig {
        sync: file_config.sync,
        http_timeout: Duration::from_secs(file_config.http.timeout_secs),
        daily_at,
        storage,
    })
}

pub fn parse_daily_at(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|e| {
        error!(error = ?e, value = raw, "Invalid schedule.daily_at");
        anyhow::anyhow!("schedule.daily_at must be HH:MM, got {raw:?}: {e}")
    })
}
