//! Utility functions for producing derived artifacts.
//!
//! ## Creating compressed copies
//!
//! ```no_run
//! use artifact_uploader::utils::compress::{gzip_file, tar_gz_file};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let source = Path::new("build/venmo_send/venmo_send.zkey");
//!
//! gzip_file(source, Path::new("/tmp/venmo_send.zkey.gz"))?;
//! tar_gz_file(source, Path::new("/tmp/venmo_send.zkey.tar.gz"))?;
//! # Ok(())
//! # }
//! ```

/// Gzip and single-member tar.gz writers
pub mod compress;
