//! # contract: the seam between the pipeline and object storage
//!
//! This module defines the [`ObjectStore`] trait and the plain data types that
//! cross it. The pipeline only ever writes objects; it never lists, reads back
//! or deletes, so the trait is a single method.
//!
//! ## Implementations
//! - The `image-bucket` binary crate implements it over an S3-compatible
//!   endpoint.
//! - Tests use the `mockall`-generated [`MockObjectStore`], exported behind the
//!   `test-export-mocks` feature so integration suites can reach it.
//!
//! ## Error handling
//! Implementors convert whatever their backend raises into a boxed error; the
//! uploader wraps it as [`crate::error::SyncError::StorageWrite`].

use std::path::Path;

use async_trait::async_trait;

use crate::error::StoreError;

/// Access policy applied to an uploaded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectAcl {
    Private,
    PublicRead,
}

impl ObjectAcl {
    /// Canned ACL name as sent in the `x-amz-acl` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectAcl::Private => "private",
            ObjectAcl::PublicRead => "public-read",
        }
    }
}

/// Everything needed to write one object.
#[derive(Debug)]
pub struct PutObjectRequest<'a> {
    /// Destination key, separators already collapsed.
    pub key: &'a str,
    /// Buffered body on local disk; read from offset zero.
    pub body_path: &'a Path,
    /// Exact size of the body in bytes.
    pub content_length: u64,
    /// Base64 of the raw 16-byte MD5 digest, for the `Content-MD5` header.
    pub content_md5: &'a str,
    pub acl: ObjectAcl,
}

/// What the store reports back after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    /// Server-side entity tag, quotes included if the server sent them.
    pub e_tag: Option<String>,
}

/// Trait for writing objects into a bucket.
///
/// The implementor owns bucket name, credentials and transport; callers only
/// describe the object.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `req.body_path` under `req.key`, replacing any existing object.
    async fn put_object<'a>(&self, req: PutObjectRequest<'a>) -> Result<StoredObject, StoreError>;
}
