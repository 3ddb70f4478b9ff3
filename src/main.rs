use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subreddit_archiver::config::{load_profile, Settings};
use subreddit_archiver::pacing::{Pacer, RetryPolicy, ThreadSleeper};
use subreddit_archiver::{preflight, Client, Pipeline, PipelineError, WaybackClient};

/// Pause between two submissions to the Wayback Machine.
const ARCHIVE_PACING: Duration = Duration::from_secs(5);

#[derive(Debug, Parser)]
#[command(name = "subreddit-archiver")]
#[command(about = "Archive reddit posts using web.archive.org")]
struct Cli {
    /// Run with debug messages.
    #[arg(short, long)]
    debug: bool,

    /// Overwrite existing output file.
    #[arg(short, long)]
    overwrite: bool,

    /// Keep retrying reddit until it answers, however long that takes.
    #[arg(long)]
    best_effort: bool,

    /// Bot profile to authenticate as.
    #[arg(short, long, env = "SUBREDDIT_ARCHIVER_BOT", default_value = "")]
    bot: String,

    /// File holding bot profiles.
    #[arg(short, long, env = "SUBREDDIT_ARCHIVER_CONFIG", default_value = "bots.toml")]
    config: PathBuf,

    /// Path to file with IDs.
    input: PathBuf,

    /// Path to output file.
    output: PathBuf,
}

fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.debug) {
        eprintln!("{e:#}");
    }

    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), PipelineError> {
    let retry = if cli.best_effort {
        RetryPolicy::metadata_best_effort()
    } else {
        RetryPolicy::metadata()
    };
    let settings = Settings::new(cli.input, cli.output, cli.bot)
        .overwrite(cli.overwrite)
        .metadata_retry(retry);

    preflight(&settings)?;

    let reddit = Client::new(load_profile(&cli.config, &settings.bot)?)?;
    let wayback = WaybackClient::new()?;
    let pacer = Pacer::new(ARCHIVE_PACING);

    Pipeline::new(&settings, &reddit, &wayback, &ThreadSleeper, &pacer).run()?;
    Ok(())
}

fn init_tracing(debug: bool) -> Result<()> {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    Ok(())
}
