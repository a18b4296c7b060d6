use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::config::lists::split_list;
use crate::constants::{DEFAULT_BUCKET, DEFAULT_PLAIN_PREFIXES, DEFAULT_TAR_PREFIXES};

/// Everything a run needs, built once at start-up and passed to the walker
/// by reference.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct UploadConfig {
    pub bucket: String,
    pub tar_prefixes: Vec<String>,
    pub plain_prefixes: Vec<String>,
    pub dirs: Vec<PathBuf>,
    pub upload_dir: String,
    pub region: Option<String>,
    pub profile: Option<String>,
    pub work_dir: Option<PathBuf>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            bucket: DEFAULT_BUCKET.to_string(),
            tar_prefixes: DEFAULT_TAR_PREFIXES.iter().map(|p| p.to_string()).collect(),
            plain_prefixes: DEFAULT_PLAIN_PREFIXES.iter().map(|p| p.to_string()).collect(),
            dirs: Vec::new(),
            upload_dir: String::new(),
            region: None,
            profile: None,
            work_dir: None,
        }
    }
}

impl UploadConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: UploadConfig = serde_yaml::from_str(&content)
            .context("Failed to parse YAML config")?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_yaml_file(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .context(format!("Failed to write config to {}", path.display()))?;

        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Overlay every option the user passed on the command line.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(bucket) = &args.bucket_name {
            self.bucket = bucket.clone();
        }
        if let Some(prefixes) = &args.prefix_to_tar {
            self.tar_prefixes = split_list(prefixes);
        }
        if let Some(prefixes) = &args.prefix {
            self.plain_prefixes = split_list(prefixes);
        }
        if let Some(dirs) = &args.dirs {
            self.dirs = split_list(dirs).into_iter().map(PathBuf::from).collect();
        }
        if let Some(upload_dir) = &args.upload_dir {
            self.upload_dir = upload_dir.clone();
        }
        if args.region.is_some() {
            self.region = args.region.clone();
        }
        if args.profile.is_some() {
            self.profile = args.profile.clone();
        }
        if args.work_dir.is_some() {
            self.work_dir = args.work_dir.clone();
        }
    }

    /// Reject configurations that cannot produce a valid request.
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            bail!("Bucket name must not be empty");
        }
        if self.dirs.is_empty() {
            warn!("No source directories configured, nothing will be uploaded");
        }
        if self.tar_prefixes.is_empty() && self.plain_prefixes.is_empty() {
            warn!("No file prefixes configured, nothing will be uploaded");
        }
        Ok(())
    }
}

/// Build the run configuration from the YAML file (if any) and the command line.
///
/// Command-line options win over the file, and the file wins over the
/// built-in defaults. A `--config` path that does not exist is an error.
pub fn load_config(args: &Args) -> Result<UploadConfig> {
    let mut config = match &args.config {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            UploadConfig::from_yaml_file(path)?
        }
        None => {
            debug!("No config path provided, using defaults");
            UploadConfig::default()
        }
    };

    config.apply_args(args);
    config.validate()?;
    Ok(config)
}
