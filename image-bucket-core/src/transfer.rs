//! Streaming uploader: one remote file into one bucket object.
//!
//! The body is spooled to a temporary file while its MD5 is computed, because
//! both the `Content-MD5` header and the upload itself need the whole body and
//! a forward-only HTTP stream can be read only once. The temporary file is
//! owned by a [`NamedTempFile`] and removed when it drops, on success and on
//! every error path alike.

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use futures::StreamExt;
use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use crate::contract::{ObjectAcl, ObjectStore, PutObjectRequest};
use crate::error::{Result, SyncError};
use crate::key::collapse_separators;

/// Outcome of one upload attempt.
#[derive(Debug)]
pub enum TransferResult {
    Success { key: String },
    Failure { source_url: String, cause: SyncError },
}

impl TransferResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TransferResult::Success { .. })
    }
}

/// Body spooled to disk, plus what is known about it.
struct BufferedBody {
    file: NamedTempFile,
    length: u64,
    md5: md5::Digest,
}

impl BufferedBody {
    fn content_md5(&self) -> String {
        BASE64_STANDARD.encode(self.md5.0)
    }

    fn md5_hex(&self) -> String {
        format!("{:x}", self.md5)
    }
}

pub struct StreamingUploader<'s, S: ObjectStore> {
    client: Client,
    store: &'s S,
    acl: ObjectAcl,
}

impl<'s, S: ObjectStore> StreamingUploader<'s, S> {
    pub fn new(client: Client, store: &'s S) -> Self {
        Self {
            client,
            store,
            acl: ObjectAcl::PublicRead,
        }
    }

    pub fn with_acl(mut self, acl: ObjectAcl) -> Self {
        self.acl = acl;
        self
    }

    /// Copies `source_url` to `destination_key`. Never returns an error;
    /// failures come back as [`TransferResult::Failure`].
    pub async fn upload(&self, source_url: &str, destination_key: &str) -> TransferResult {
        let key = collapse_separators(destination_key);
        match self.try_upload(source_url, &key).await {
            Ok(()) => {
                info!(key = %key, "[SYNC][UPLOAD] Uploaded");
                TransferResult::Success { key }
            }
            Err(cause) => {
                error!(source_url, key = %key, error = %cause, "[SYNC][ERROR][UPLOAD] Upload failed");
                TransferResult::Failure {
                    source_url: source_url.to_owned(),
                    cause,
                }
            }
        }
    }

    async fn try_upload(&self, source_url: &str, key: &str) -> Result<()> {
        info!(source_url, key, "[SYNC][UPLOAD] Downloading image");
        let body = self.buffer(source_url).await?;
        let content_md5 = body.content_md5();
        debug!(
            source_url,
            length = body.length,
            md5 = %body.md5_hex(),
            path = %body.file.path().display(),
            "[SYNC][UPLOAD] Buffered body"
        );

        let req = PutObjectRequest {
            key,
            body_path: body.file.path(),
            content_length: body.length,
            content_md5: &content_md5,
            acl: self.acl,
        };
        let stored = self
            .store
            .put_object(req)
            .await
            .map_err(|source| SyncError::StorageWrite {
                key: key.to_owned(),
                source,
            })?;

        verify_e_tag(source_url, stored.e_tag.as_deref(), &body.md5_hex())
    }

    /// Streams the response into a fresh temporary file, hashing as it goes.
    async fn buffer(&self, source_url: &str) -> Result<BufferedBody> {
        let fetch_error = |reason: String| SyncError::FileFetch {
            url: source_url.to_owned(),
            reason,
        };

        let response = self
            .client
            .get(source_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| fetch_error(e.to_string()))?;
        if response.content_length().is_none() {
            warn!(source_url, "[SYNC][UPLOAD] Response has no Content-Length; using buffered size");
        }

        let file = NamedTempFile::new()?;
        let mut writer = tokio::fs::File::from_std(file.reopen()?);
        let mut context = md5::Context::new();
        let mut stream = response.bytes_stream();
        // A body shorter than its Content-Length surfaces here as a chunk error.
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| fetch_error(e.to_string()))?;
            context.consume(&chunk);
            writer.write_all(&chunk).await?;
        }
        writer.flush().await?;
        drop(writer);

        let length = file.as_file().metadata()?.len();
        if length == 0 {
            return Err(SyncError::Integrity {
                url: source_url.to_owned(),
                reason: "empty body, nothing to checksum".to_owned(),
            });
        }

        Ok(BufferedBody {
            file,
            length,
            md5: context.compute(),
        })
    }
}

/// Compares a single-part ETag with the local MD5. Multipart ETags
/// (`<hex>-<parts>`) and absent ones cannot be checked and are accepted.
fn verify_e_tag(source_url: &str, e_tag: Option<&str>, md5_hex: &str) -> Result<()> {
    let Some(raw) = e_tag else {
        return Ok(());
    };
    let tag = raw.trim_matches('"');
    let single_part = tag.len() == 32 && tag.bytes().all(|b| b.is_ascii_hexdigit());
    if single_part && !tag.eq_ignore_ascii_case(md5_hex) {
        return Err(SyncError::Integrity {
            url: source_url.to_owned(),
            reason: format!("stored ETag {tag} does not match local MD5 {md5_hex}"),
        });
    }
    Ok(())
}
