#![doc = "Object store integration for the CLI: bridges the core `ObjectStore` trait to an S3-compatible bucket."]
//
//! # Object store integration (CLI <-> Core)
//!
//! This module wires the [`ObjectStore`] trait from `image-bucket-core` to a
//! real bucket through `aws-sdk-s3`. Any S3-compatible service works (AWS,
//! Wasabi, MinIO, R2): the endpoint is explicit and path-style addressing is
//! forced.
//!
//! ## Client Usage
//!
//! - Build a [`StorageConfig`] with [`StorageConfig::from_env`] (`AWS_DEFAULT_REGION`,
//!   `AWS_ENDPOINT`, `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_BUCKET`).
//! - Construct an [`S3Store`] from it and hand it to the core `synchronise`.
//!
//! The SDK's own retries and optional flexible checksums are switched off:
//! a failed write is reported once, and integrity is carried by `Content-MD5`.

use std::env;
use std::fmt;

use async_trait::async_trait;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{
    BehaviorVersion, Credentials, Region, RequestChecksumCalculation, ResponseChecksumValidation,
};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use image_bucket_core::contract::{ObjectAcl, ObjectStore, PutObjectRequest, StoredObject};
use image_bucket_core::error::{StoreError, SyncError};

pub const ENV_REGION: &str = "AWS_DEFAULT_REGION";
pub const ENV_ENDPOINT: &str = "AWS_ENDPOINT";
pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_BUCKET: &str = "AWS_BUCKET";

/// Where and as whom to write. Every field is required.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub region: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
}

// Keeps the secret out of logs.
impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl StorageConfig {
    /// Reads all storage settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Configuration`] naming the first variable that is
    /// unset or blank; no client is built without credentials.
    pub fn from_env() -> Result<Self, SyncError> {
        let config = Self {
            region: require_env(ENV_REGION)?,
            endpoint: require_env(ENV_ENDPOINT)?,
            access_key_id: require_env(ENV_ACCESS_KEY_ID)?,
            secret_access_key: require_env(ENV_SECRET_ACCESS_KEY)?,
            bucket: require_env(ENV_BUCKET)?,
        };
        tracing::info!(
            region = %config.region,
            endpoint = %config.endpoint,
            bucket = %config.bucket,
            "Loaded storage configuration from environment"
        );
        Ok(config)
    }
}

fn require_env(name: &str) -> Result<String, SyncError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => {
            tracing::error!(var = name, "Environment variable is empty");
            Err(SyncError::Configuration(format!("{name} is set but empty")))
        }
        Err(e) => {
            tracing::error!(var = name, error = ?e, "Environment variable missing");
            Err(SyncError::Configuration(format!("{name} environment variable not set")))
        }
    }
}

pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    pub fn new(config: &StorageConfig) -> Self {
        let creds = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "image-bucket-env",
        );
        let sdk_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(config.region.clone()))
            .credentials_provider(creds)
            .force_path_style(true)
            .retry_config(RetryConfig::disabled())
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .build();
        tracing::info!(bucket = %config.bucket, endpoint = %config.endpoint, "Initialized S3Store");
        Self {
            client: aws_sdk_s3::Client::from_conf(sdk_config),
            bucket: config.bucket.clone(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

fn canned_acl(acl: ObjectAcl) -> ObjectCannedAcl {
    match acl {
        ObjectAcl::Private => ObjectCannedAcl::Private,
        ObjectAcl::PublicRead => ObjectCannedAcl::PublicRead,
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object<'a>(&self, req: PutObjectRequest<'a>) -> Result<StoredObject, StoreError> {
        tracing::debug!(
            bucket = %self.bucket,
            key = req.key,
            content_length = req.content_length,
            acl = req.acl.as_str(),
            "Writing object"
        );
        let body = ByteStream::from_path(req.body_path).await?;
        let content_length = i64::try_from(req.content_length)?;

        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(req.key)
            .body(body)
            .content_length(content_length)
            .content_md5(req.content_md5)
            .acl(canned_acl(req.acl))
            .send()
            .await;

        match result {
            Ok(output) => {
                tracing::debug!(key = req.key, e_tag = ?output.e_tag(), "PutObject succeeded");
                Ok(StoredObject {
                    key: req.key.to_owned(),
                    e_tag: output.e_tag().map(str::to_owned),
                })
            }
            Err(e) => {
                let message = DisplayErrorContext(e).to_string();
                tracing::error!(bucket = %self.bucket, key = req.key, error = %message, "PutObject failed");
                Err(format!("PutObject s3://{}/{}: {message}", self.bucket, req.key).into())
            }
        }
    }
}
