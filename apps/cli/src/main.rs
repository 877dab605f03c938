//! `apkdrop`: upload Android packages to a device testing provider.

mod console;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use apkdrop_protocol::{Blob, format_size};
use apkdrop_settings::{Settings, StagingMode, config_path};
use apkdrop_upload::{UploadObserver, UploadOrchestrator, UploadPolicy, UploadRecord};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleObserver;

#[derive(Debug, Parser)]
#[command(author, version, about = "Upload Android packages for device testing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload a package and print the provider app URL.
    Upload(UploadArgs),
    /// Check a package against the file policy without uploading it.
    Validate {
        file: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the effective settings with secrets masked.
    Config {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct UploadArgs {
    file: PathBuf,
    /// Config file; defaults to the platform config path.
    #[arg(long)]
    config: Option<PathBuf>,
    /// When to stage the package in object storage first.
    #[arg(long, value_enum)]
    staging: Option<StagingArg>,
    /// Size above which packages are staged, with `--staging above-threshold`.
    #[arg(long)]
    threshold_bytes: Option<u64>,
    /// Share of overall progress given to the staging leg (1-99).
    #[arg(long)]
    split: Option<u8>,
    /// Print the final upload record as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StagingArg {
    Always,
    AboveThreshold,
    Never,
}

impl From<StagingArg> for StagingMode {
    fn from(arg: StagingArg) -> Self {
        match arg {
            StagingArg::Always => StagingMode::Always,
            StagingArg::AboveThreshold => StagingMode::AboveThreshold,
            StagingArg::Never => StagingMode::Never,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `--json` output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Upload(args) => upload(args).await,
        Command::Validate { file, config } => validate(&file, config.as_deref()).await,
        Command::Config { config } => show_config(config.as_deref()),
    }
}

async fn upload(args: UploadArgs) -> Result<()> {
    let mut settings = load_settings(args.config.as_deref())?;
    apply_overrides(&mut settings, &args);
    let policy = settings.upload_policy()?;

    // Reject bad files before reading them into memory.
    check_file(&policy, &args.file).await?;
    let blob = Blob::read_from(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let provider = Arc::new(apkdrop_device_testing::Client::new(
        settings.provider_config(),
    )?);
    let storage = Arc::new(apkdrop_object_storage::Client::new(
        settings.storage_config(),
    )?);
    let orchestrator = UploadOrchestrator::new(provider, policy).with_storage(storage);

    let observer = ConsoleObserver::default();
    let mut record = UploadRecord::new(blob.name(), blob.size());
    observer.on_create(&record);

    let result = orchestrator.submit(&mut record, &blob, &observer).await;

    if args.json {
        // Print the record as observers saw it.
        let stored = observer.store().get(&record.id).unwrap_or(record);
        println!("{}", serde_json::to_string_pretty(&stored)?);
    }
    let outcome = result?;
    if !args.json {
        println!("{}", outcome.app.app_url);
    }
    Ok(())
}

async fn validate(file: &Path, config: Option<&Path>) -> Result<()> {
    let settings = load_settings(config)?;
    let policy = settings.upload_policy()?;
    let (name, size) = check_file(&policy, file).await?;
    println!("{name}: ok ({})", format_size(size));
    Ok(())
}

fn show_config(config: Option<&Path>) -> Result<()> {
    let settings = load_settings(config)?;
    let source = config.map(Path::to_path_buf).unwrap_or_else(config_path);
    println!("# {}", source.display());
    print!("{}", settings.redacted().to_toml()?);
    Ok(())
}

/// Loads the config file, applies environment overrides and validates.
fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::load(path)?;
    settings.apply_env();
    settings.validate()?;
    Ok(settings)
}

fn apply_overrides(settings: &mut Settings, args: &UploadArgs) {
    if let Some(staging) = args.staging {
        settings.upload.staging = staging.into();
    }
    if let Some(threshold) = args.threshold_bytes {
        settings.upload.staging_threshold_bytes = threshold;
    }
    if let Some(split) = args.split {
        settings.upload.split_point = split;
    }
}

/// Validates a file from its name and on-disk size.
async fn check_file(policy: &UploadPolicy, path: &Path) -> Result<(String, u64)> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("cannot access {}", path.display()))?;
    if !metadata.is_file() {
        bail!("{} is not a file", path.display());
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    policy.files.validate(&name, metadata.len(), None)?;
    Ok((name, metadata.len()))
}
