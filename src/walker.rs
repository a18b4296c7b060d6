//! Directory walk, prefix classification and per-file upload steps.
//!
//! Processing is strictly sequential: directories in configured order, then
//! entries in the order `read_dir` yields them, and one file's uploads all
//! complete before the next file starts. The first error aborts the walk.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use tempfile::TempDir;

use crate::cloud::s3::ObjectStore;
use crate::config::UploadConfig;
use crate::constants::{GZIP_EXTENSION, SCRATCH_DIR_PREFIX, TAR_GZ_EXTENSION};
use crate::utils::compress::{gzip_file, tar_gz_file};

/// How a file name matched the two prefix sets.
///
/// The two checks are independent; a file matching both is handled both ways.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    pub tar: bool,
    pub plain: bool,
}

impl Classification {
    /// Whether the file produces any upload at all
    pub fn is_candidate(&self) -> bool {
        self.tar || self.plain
    }
}

/// Classify `file_name` against the configured prefix sets
pub fn classify(file_name: &str, config: &UploadConfig) -> Classification {
    Classification {
        tar: config.tar_prefixes.iter().any(|p| file_name.starts_with(p.as_str())),
        plain: config.plain_prefixes.iter().any(|p| file_name.starts_with(p.as_str())),
    }
}

/// Build the object key for `file_name` under `upload_dir`.
///
/// The key is always `<upload_dir>/<file_name>` verbatim, so an empty
/// `upload_dir` gives `/<file_name>` and a trailing slash is kept.
pub fn destination_key(upload_dir: &str, file_name: &str) -> String {
    format!("{}/{}", upload_dir, file_name)
}

/// Counters collected over one walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkReport {
    pub directories: usize,
    pub entries: usize,
    pub tar_candidates: usize,
    pub plain_candidates: usize,
    pub uploads: usize,
}

/// Walks the configured directories and uploads matching files to `store`.
pub struct Walker<'a, S: ObjectStore + ?Sized> {
    config: &'a UploadConfig,
    store: &'a S,
}

impl<'a, S: ObjectStore + ?Sized> Walker<'a, S> {
    pub fn new(config: &'a UploadConfig, store: &'a S) -> Self {
        Walker { config, store }
    }

    /// Process every configured directory once, in order.
    pub async fn run(&self) -> Result<WalkReport> {
        let mut report = WalkReport::default();

        for dir in &self.config.dirs {
            self.process_directory(dir, &mut report).await?;
        }

        debug!("Walk finished: {:?}", report);
        Ok(report)
    }

    /// Process the immediate entries of one directory.
    pub async fn process_directory(&self, dir: &Path, report: &mut WalkReport) -> Result<()> {
        info!("Scanning {}", dir.display());
        report.directories += 1;

        let entries = fs::read_dir(dir)
            .context(format!("Failed to read directory {}", dir.display()))?;

        for entry in entries {
            let entry = entry
                .context(format!("Failed to read entry in {}", dir.display()))?;
            report.entries += 1;

            let path = entry.path();
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                debug!("Skipping non UTF-8 file name {}", path.display());
                continue;
            };

            let classification = classify(file_name, self.config);
            if !classification.is_candidate() {
                continue;
            }

            let metadata = fs::metadata(&path)
                .context(format!("Failed to get metadata for {}", path.display()))?;
            if !metadata.is_file() {
                warn!("Skipping {}, matches a prefix but is not a regular file", path.display());
                continue;
            }

            self.process_file(&path, file_name, classification, report).await?;
        }

        Ok(())
    }

    async fn process_file(
        &self,
        path: &Path,
        file_name: &str,
        classification: Classification,
        report: &mut WalkReport,
    ) -> Result<()> {
        if classification.tar && classification.plain {
            warn!("{} matches both prefix sets and will be uploaded twice", file_name);
        }

        if classification.tar {
            report.tar_candidates += 1;
            self.process_tar_candidate(path, file_name, report).await?;
        }

        if classification.plain {
            report.plain_candidates += 1;
            self.upload(path, file_name, report).await?;
        }

        Ok(())
    }

    /// Upload the original, its gzip copy and its single-member tar.gz.
    ///
    /// Derived artifacts live in a scratch directory that is removed when this
    /// returns, whether or not the uploads succeeded.
    async fn process_tar_candidate(
        &self,
        path: &Path,
        file_name: &str,
        report: &mut WalkReport,
    ) -> Result<()> {
        self.upload(path, file_name, report).await?;

        let scratch = self.scratch_dir()?;

        let gz_name = format!("{}{}", file_name, GZIP_EXTENSION);
        let gz_path = scratch.path().join(&gz_name);
        info!("Compressing .gz: {}", path.display());
        gzip_file(path, &gz_path)?;
        self.upload(&gz_path, &gz_name, report).await?;

        let tar_name = format!("{}{}", file_name, TAR_GZ_EXTENSION);
        let tar_path = scratch.path().join(&tar_name);
        info!("Compressing .tar.gz: {}", path.display());
        tar_gz_file(path, &tar_path)?;
        self.upload(&tar_path, &tar_name, report).await?;

        let scratch_path = scratch.path().to_path_buf();
        scratch.close()
            .context(format!("Failed to remove scratch directory {}", scratch_path.display()))?;

        Ok(())
    }

    async fn upload(&self, local_path: &Path, name: &str, report: &mut WalkReport) -> Result<()> {
        let key = destination_key(&self.config.upload_dir, name);

        info!("Starting upload of {} to s3://{}/{}...", name, self.config.bucket, key);
        self.store.upload_file(local_path, &key).await?;
        info!("Done uploading {}!", name);

        report.uploads += 1;
        Ok(())
    }

    fn scratch_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_DIR_PREFIX);

        match &self.config.work_dir {
            Some(dir) => builder.tempdir_in(dir)
                .context(format!("Failed to create scratch directory in {}", dir.display())),
            None => builder.tempdir()
                .context("Failed to create scratch directory"),
        }
    }
}
