use serial_test::serial;
use std::env;
use std::fs::write;
use std::time::Duration;

use chrono::NaiveTime;
use image_bucket::load_config::{load_config, load_file_config};
use image_bucket::upload::{
    StorageConfig, ENV_ACCESS_KEY_ID, ENV_BUCKET, ENV_ENDPOINT, ENV_REGION, ENV_SECRET_ACCESS_KEY,
};
use image_bucket_core::error::SyncError;
use tempfile::NamedTempFile;

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();
    file
}

fn set_storage_env() {
    env::set_var(ENV_REGION, "eu-central-1");
    env::set_var(ENV_ENDPOINT, "https://s3.eu-central-1.wasabisys.com");
    env::set_var(ENV_ACCESS_KEY_ID, "AKIAEXAMPLE");
    env::set_var(ENV_SECRET_ACCESS_KEY, "secret");
    env::set_var(ENV_BUCKET, "images");
}

#[test]
#[serial]
fn test_load_config_merges_file_and_environment() {
    let file = config_file(
        r#"
root_url: "https://files.example.com/uploads/2024/"
destination_prefix: "example.com/uploads/2024/"
flatten_months: true
image_extensions: [png, JPG]
http:
  timeout_secs: 30
schedule:
  daily_at: "03:58"
"#,
    );
    set_storage_env();

    let config = load_config(file.path()).expect("Config should load");

    assert_eq!(config.sync.root_url, "https://files.example.com/uploads/2024/");
    assert_eq!(config.sync.destination_prefix, "example.com/uploads/2024/");
    assert!(config.sync.flatten_months);
    assert!(config.sync.image_extensions.contains("jpg"));
    assert!(!config.sync.image_extensions.contains("gif"));
    assert_eq!(config.http_timeout, Duration::from_secs(30));
    assert_eq!(config.daily_at, NaiveTime::from_hms_opt(3, 58, 0).unwrap());
    assert_eq!(config.storage.bucket, "images");
    assert_eq!(config.storage.region, "eu-central-1");
}

#[test]
#[serial]
fn test_optional_sections_use_defaults() {
    let file = config_file(
        r#"
root_url: "https://files.example.com/uploads/"
destination_prefix: "mirror/"
"#,
    );
    set_storage_env();

    let config = load_config(file.path()).expect("Config should load");

    assert!(!config.sync.flatten_months);
    for ext in ["jpg", "jpeg", "png", "gif", "webp"] {
        assert!(config.sync.image_extensions.contains(ext), "{ext}");
    }
    assert_eq!(config.http_timeout, Duration::from_secs(120));
    assert_eq!(config.daily_at, NaiveTime::from_hms_opt(0, 0, 0).unwrap());
}

#[test]
#[serial]
fn test_missing_environment_variable_is_a_configuration_error() {
    set_storage_env();
    env::remove_var(ENV_BUCKET);

    let err = StorageConfig::from_env().unwrap_err();
    match err {
        SyncError::Configuration(msg) => assert!(msg.contains(ENV_BUCKET), "{msg}"),
        other => panic!("expected configuration error, got {other:?}"),
    }

    let file = config_file("root_url: \"https://x.example/\"\ndestination_prefix: \"m/\"\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains(ENV_BUCKET), "{err}");
}

#[test]
#[serial]
fn test_blank_environment_variable_is_rejected() {
    set_storage_env();
    env::set_var(ENV_SECRET_ACCESS_KEY, "   ");

    let err = StorageConfig::from_env().unwrap_err();
    assert!(matches!(err, SyncError::Configuration(_)), "{err:?}");
}

#[test]
fn test_invalid_yaml_is_rejected() {
    let file = config_file("root_url: [unterminated\n");
    assert!(load_file_config(file.path()).is_err());
}

#[test]
fn test_missing_root_url_is_rejected() {
    let file = config_file("destination_prefix: \"mirror/\"\n");
    assert!(load_file_config(file.path()).is_err());
}

#[test]
fn test_zero_timeout_is_rejected() {
    let file = config_file(
        "root_url: \"https://x.example/\"\ndestination_prefix: \"m/\"\nhttp:\n  timeout_secs: 0\n",
    );
    let err = load_file_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("timeout_secs"), "{err}");
}

#[test]
#[serial]
fn test_malformed_daily_at_is_rejected() {
    set_storage_env();
    let file = config_file(
        "root_url: \"https://x.example/\"\ndestination_prefix: \"m/\"\nschedule:\n  daily_at: \"2am\"\n",
    );
    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_missing_file_is_reported() {
    let err = load_file_config("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"), "{err}");
}
