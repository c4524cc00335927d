#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use image_bucket_core::contract::{MockObjectStore, ObjectAcl, PutObjectRequest, StoredObject};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// One `put_object` call as the store saw it.
#[derive(Debug, Clone)]
pub struct RecordedPut {
    pub key: String,
    pub body: Vec<u8>,
    pub body_path: PathBuf,
    pub content_length: u64,
    pub content_md5: String,
    pub acl: ObjectAcl,
}

pub type Recorded = Arc<Mutex<Vec<RecordedPut>>>;

/// A store that accepts everything except keys ending in one of `fail_suffixes`,
/// reporting the real MD5 of what it read as the ETag.
pub fn recording_store(fail_suffixes: &'static [&'static str]) -> (MockObjectStore, Recorded) {
    let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = recorded.clone();
    let mut store = MockObjectStore::new();
    store
        .expect_put_object()
        .returning(move |req: PutObjectRequest<'_>| {
            let body = std::fs::read(req.body_path)?;
            sink.lock().unwrap().push(RecordedPut {
                key: req.key.to_owned(),
                body: body.clone(),
                body_path: req.body_path.to_path_buf(),
                content_length: req.content_length,
                content_md5: req.content_md5.to_owned(),
                acl: req.acl,
            });
            if fail_suffixes.iter().any(|s| req.key.ends_with(s)) {
                return Err("simulated storage failure: AccessDenied".into());
            }
            Ok(StoredObject {
                key: req.key.to_owned(),
                e_tag: Some(format!("\"{:x}\"", md5::compute(&body))),
            })
        });
    (store, recorded)
}

pub fn keys(recorded: &Recorded) -> Vec<String> {
    recorded.lock().unwrap().iter().map(|p| p.key.clone()).collect()
}

pub fn content_md5_of(bytes: &[u8]) -> String {
    BASE64_STANDARD.encode(md5::compute(bytes).0)
}

/// Serves an nginx-style autoindex page listing `links` at `at`.
pub async fn mount_index(server: &MockServer, at: &str, links: &[&str]) {
    let rows: Vec<String> = links
        .iter()
        .map(|l| format!(r#"<a href="{l}">{l}</a>          01-Jan-2024 00:00    -"#))
        .collect();
    let html = format!(
        "<html><head><title>Index of {at}</title></head><body><h1>Index of {at}</h1><hr><pre>{}</pre><hr></body></html>",
        rows.join("\n")
    );
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(html),
        )
        .mount(server)
        .await;
}

pub async fn mount_file(server: &MockServer, at: &str, bytes: &[u8]) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(bytes.to_vec()),
        )
        .mount(server)
        .await;
}

/// Fails the test on server drop if `at` is ever requested.
pub async fn mount_untouched(server: &MockServer, at: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}
