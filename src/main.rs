use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{check_wishlist, load_config, parse_table, run};

#[derive(Parser)]
#[command(
    name = "yoyaku",
    version,
    about = "Automatic tennis court booking for the municipal reservation site",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configuration
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, walk the calendar and book slots matching the wish list
    Run {
        /// Walk and match without submitting booking forms
        #[arg(long, default_value = "false")]
        dry_run: bool,
    },

    /// Parse the wish list and print the resolved entries
    CheckWishlist,

    /// Extract slots from a saved facility table page
    ParseTable {
        /// HTML file
        file: PathBuf,

        /// Date of the page (YYYYMMDD)
        #[arg(short, long)]
        date: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config)?;

    // Initialize tracing/logging
    let format = cli
        .log_format
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&format, &config.logging.level, cli.verbose)?;

    tracing::info!("yoyaku starting");

    match cli.command {
        Commands::Run { dry_run } => {
            tracing::info!(dry_run = %dry_run, "Starting run command");
            run(config, dry_run).await?;
        }

        Commands::CheckWishlist => {
            tracing::info!(
                path = %config.inputs.wish_list_path.display(),
                "Starting check-wishlist command"
            );
            check_wishlist(config).await?;
        }

        Commands::ParseTable { file, date } => {
            tracing::info!(
                file = %file.display(),
                date = %date,
                "Starting parse-table command"
            );
            parse_table(&file, &date).await?;
        }
    }

    tracing::info!("yoyaku completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("yoyaku=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("yoyaku={level},warn"))?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
