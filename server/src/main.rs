use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use attendance_server::cli::{execute_command, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    execute_command(Cli::parse()).await
}
