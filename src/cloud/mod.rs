//! Cloud storage integration for artifact uploads.
//!
//! The walker only talks to the [`s3::ObjectStore`] trait; [`s3::S3Uploader`]
//! is the production implementation backed by rusoto.
//!
//! Every object is written with the `public-read` canned ACL and the
//! `binary/octet-stream` content type, replacing any object already at
//! the same key.
//!
//! ## Usage Example
//!
//! ```no_run
//! use artifact_uploader::cloud::s3::{ObjectStore, S3Uploader};
//! use artifact_uploader::config::UploadConfig;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = UploadConfig::default();
//! let uploader = S3Uploader::from_config(&config)?;
//!
//! uploader.upload_file(Path::new("build/venmo_send.wasm"), "v1/venmo_send.wasm").await?;
//! # Ok(())
//! # }
//! ```

/// S3 upload implementation and the storage trait
pub mod s3;

/// S3 client construction
pub mod client;
