#![doc = "image-bucket-core: core pipeline library for image-bucket."]

//! This crate holds the crawl-transform-upload pipeline that mirrors a web
//! server's directory index of images into an object-storage bucket.
//! Credentials, the concrete storage client and the command line live in the
//! `image-bucket` binary crate.
//!
//! # Usage
//! Build a [`config::SyncConfig`], provide an [`contract::ObjectStore`] and a
//! `reqwest::Client`, then call [`synchronise::synchronise`].

pub mod classify;
pub mod config;
pub mod contract;
pub mod error;
pub mod key;
pub mod listing;
pub mod synchronise;
pub mod transfer;
pub mod walker;
