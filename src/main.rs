use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use artifact_uploader::cli::{Args, Commands};
use artifact_uploader::cloud::s3::S3Uploader;
use artifact_uploader::config::{load_config, UploadConfig};
use artifact_uploader::walker::Walker;

fn main() -> Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    initialize_logging(args.verbose)?;

    // Handle subcommands
    if let Some(cmd) = &args.command {
        return handle_subcommand(cmd);
    }

    let config = load_config(&args)?;

    info!("Uploading from {} directories to bucket {}", config.dirs.len(), config.bucket);

    run_upload(&config)?;

    info!("Upload completed");
    Ok(())
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ).context("Failed to initialize logger")?;
    Ok(())
}

/// Handle subcommands
fn handle_subcommand(cmd: &Commands) -> Result<()> {
    match cmd {
        Commands::InitConfig { path } => {
            info!("Creating default configuration file at {}", path.display());
            UploadConfig::default().save_to_yaml_file(path)?;
            Ok(())
        }
    }
}

/// Walk the configured directories on a single-threaded runtime
fn run_upload(config: &UploadConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(async {
        let uploader = S3Uploader::from_config(config)?;
        Walker::new(config, &uploader).run().await?;
        Ok::<_, anyhow::Error>(())
    })?;

    Ok(())
}
