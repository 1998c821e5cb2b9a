mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{handle_check, handle_index, handle_search, handle_status, Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Index { docs, full } => {
            handle_index(cli.config.as_deref(), docs, full).await?;
        }
        Commands::Check {
            text,
            category,
            json,
        } => {
            handle_check(cli.config.as_deref(), text, category, json).await?;
        }
        Commands::Search {
            query,
            top,
            statute,
        } => {
            handle_search(cli.config.as_deref(), query, top, statute).await?;
        }
        Commands::Status { docs } => {
            handle_status(cli.config.as_deref(), docs)?;
        }
    }

    Ok(())
}
