use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use configuration::ConfigError;
use database::ViewRepository;
use exporter::run_exports;
use publisher::{GitRepository, PublishOutcome};
use snapshot::SnapshotWriter;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Exports reporting views from PostgreSQL to dated JSON snapshots and
/// publishes them to a git remote.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The file holding the DB_* and OUTPUT_DIR settings. May also set RUST_LOG.
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Optional list of export targets. The built-in views are exported when
    /// this file does not exist.
    #[arg(long, default_value = "exports.toml")]
    targets: PathBuf,

    /// The export date (format: YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Write the snapshots but leave git alone.
    #[arg(long)]
    skip_publish: bool,
}

/// The main entry point for the archivist export run.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // The env file is read before logging starts so a RUST_LOG in it applies.
    // Its error, if any, is reported once the subscriber is installed.
    let env_file = configuration::load_env_file(&cli.env_file);

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install the log subscriber: {}", e);
    }

    match run(cli, env_file).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` from the environment, `info` when unset or invalid.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// One complete run: configuration, export phase, publish phase.
async fn run(cli: Cli, env_file: Result<(), ConfigError>) -> Result<()> {
    // 1. Configuration. Nothing has touched the database or disk yet.
    env_file.context("Error loading configuration")?;
    let config =
        configuration::load_config(&cli.targets).context("Error loading configuration")?;
    let export_date = cli.date.unwrap_or_else(|| Local::now().date_naive());

    // 2. Connect
    let conn = database::connect(&config.database)
        .await
        .context("Error connecting to database")?;
    let mut views = ViewRepository::new(conn);

    // 3. Export every target into the output directory
    let writer = SnapshotWriter::create(&config.output_dir)
        .context("Error creating output directory")?;

    tracing::info!(
        exports = config.exports.len(),
        date = %export_date,
        output_dir = %config.output_dir.display(),
        "Starting export."
    );
    let report = run_exports(&mut views, &config.exports, &writer, export_date).await;

    if let Err(e) = views.close().await {
        tracing::warn!(error = %e, "Failed to close the database connection cleanly.");
    }

    // 4. Publish
    if cli.skip_publish {
        tracing::info!("Skipping Git operations.");
    } else {
        let repo = GitRepository::new(&config.output_dir, config.git.clone());
        match repo
            .publish(export_date)
            .context("Error with Git operations")?
        {
            PublishOutcome::Pushed => tracing::info!("Snapshots committed and pushed."),
            PublishOutcome::NothingToCommit => {
                tracing::info!("Snapshots unchanged since the last export.")
            }
        }
    }

    if !report.is_complete() {
        anyhow::bail!(
            "{} of {} exports failed: {}",
            report.failed.len(),
            config.exports.len(),
            report.failed_names().join(", ")
        );
    }

    tracing::info!("Run completed successfully.");
    Ok(())
}
