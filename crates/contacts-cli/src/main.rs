//! Contactbook CLI entry point.
//!
//! Binary name: `contacts`
//!
//! Parses CLI arguments, initializes the database and configuration, then
//! dispatches to the matching command handler.

mod cli;
mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins when set
    let filter = cli.log_filter();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let state = AppState::init().await?;

    match cli.command {
        Commands::User { action } => cli::user::run(&state, action, cli.json).await?,
        Commands::Contact { action } => cli::contact::run(&state, action, cli.json).await?,
    }

    Ok(())
}
