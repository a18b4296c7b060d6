//! # artifact-uploader
//!
//! Publishes build artifacts (proving keys, wasm witness generators,
//! verification keys) from local build directories to an S3 bucket.
//!
//! ## Overview
//!
//! For every configured directory the walker looks at each immediate file:
//!
//! - Files whose name starts with a **tar prefix** are uploaded as-is, then as
//!   a gzip copy (`<name>.gz`) and as a single-member tar archive
//!   (`<name>.tar.gz`). The compressed copies are written to a scratch
//!   directory that is removed once the file is done.
//! - Files whose name starts with a **plain prefix** are uploaded as-is.
//!
//! Objects land at `<upload_dir>/<name>` with a `public-read` ACL and the
//! `binary/octet-stream` content type. Processing is sequential and the
//! first error aborts the run.
//!
//! ## Usage
//!
//! ```no_run
//! use artifact_uploader::cloud::s3::S3Uploader;
//! use artifact_uploader::config::UploadConfig;
//! use artifact_uploader::walker::Walker;
//! use std::path::PathBuf;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = UploadConfig {
//!     dirs: vec![PathBuf::from("build/venmo_send")],
//!     upload_dir: "v0.2.0".to_string(),
//!     ..Default::default()
//! };
//!
//! let uploader = S3Uploader::from_config(&config)?;
//! let report = Walker::new(&config, &uploader).run().await?;
//!
//! println!("Uploaded {} objects", report.uploads);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: Run configuration, YAML files and option merging
//! - [`walker`]: Directory walk, classification and upload steps
//! - [`cloud`]: S3 upload implementation
//! - [`utils`]: Gzip and tar.gz writers
//! - [`constants`]: Defaults and fixed object attributes

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Run configuration
pub mod config;

/// Directory walk and per-file processing
pub mod walker;

/// Cloud storage integration (S3)
pub mod cloud;

/// Compression utilities
pub mod utils;

/// Application constants and configuration values
pub mod constants;
