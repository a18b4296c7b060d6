use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::constants::DEFAULT_CONFIG_FILE;

/// Command-line arguments for the artifact uploader.
///
/// Every option is optional. Options left unset fall back to the YAML
/// configuration (when `--config` is given) and then to the built-in
/// defaults, so the fields here stay `Option`s and the merge happens in
/// [`crate::config::load_config`].
#[derive(Parser, Debug)]
#[clap(name = "artifact-uploader", about = "Compress build artifacts and upload them to S3")]
pub struct Args {
    /// Name of the S3 bucket (default: zk-p2p)
    #[clap(long, alias = "bucket_name")]
    pub bucket_name: Option<String>,

    /// Comma-separated prefixes of files to upload along with .gz and .tar.gz copies
    #[clap(long, alias = "prefix_to_tar")]
    pub prefix_to_tar: Option<String>,

    /// Comma-separated prefixes of files to upload without compression
    #[clap(long)]
    pub prefix: Option<String>,

    /// Comma-separated list of directories to upload from
    #[clap(long)]
    pub dirs: Option<String>,

    /// Key prefix inside the bucket
    #[clap(long, alias = "upload_dir")]
    pub upload_dir: Option<String>,

    /// AWS region for S3 uploads
    #[clap(long)]
    pub region: Option<String>,

    /// AWS profile to use for S3 uploads
    #[clap(long)]
    pub profile: Option<String>,

    /// Parent directory for temporary compressed copies (default: system temp dir)
    #[clap(long, alias = "work_dir")]
    pub work_dir: Option<PathBuf>,

    /// Path to configuration YAML file
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the default configuration to a YAML file
    InitConfig {
        /// Path to output configuration file
        #[clap(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
    },
}
