mod client;
mod commands;
mod render;
mod utils;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use commands::config::ConfigAction;
use timetable_core::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mtuci-timetable", version)]
#[command(about = "Sync the MTUCI class timetable into calendar notes in your vault")]
struct Cli {
    /// Log requests and intermediate timetables to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the notes for this week and the next with the current timetable
    Sync {
        /// Fetch and show the notes without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Treat this date (YYYY-MM-DD) as today
        #[arg(long)]
        today: Option<String>,
    },
    /// Inspect or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "mtuci_timetable=debug,timetable_core=debug"
    } else {
        "mtuci_timetable=warn,timetable_core=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::load()?;

    match cli.command {
        Commands::Sync { dry_run, today } => {
            let today = today
                .as_deref()
                .map(|s| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .with_context(|| format!("Invalid date '{s}'. Expected YYYY-MM-DD"))
                })
                .transpose()?;
            commands::sync::run(settings.with_env_overrides(), today, dry_run).await
        }
        Commands::Config { action } => commands::config::run(settings, action),
    }
}
