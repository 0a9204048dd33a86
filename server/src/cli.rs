//! Command line entry points: run the server or perform one-off setup tasks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use shared::Role;

use crate::backend::config::{AppConfig, RootAccountConfig};
use crate::backend::storage::DbConnection;
use crate::backend::{create_router, initialize_backend, AppState};

/// Youth attendance tracker server
#[derive(Debug, Parser)]
#[command(name = "attendance-server", version, about = "Youth attendance tracker backend", long_about = None)]
pub struct Cli {
    /// SQLite database URL
    #[arg(long, global = true, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address the HTTP server listens on
    #[arg(long, global = true, env = "BIND_ADDR")]
    pub bind: Option<SocketAddr>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Create the database schema
    InitDb,
    /// Create or update the privileged account from ROOT_ADMIN_USER / ROOT_ADMIN_PASS / ROOT_ADMIN_ROLE
    BootstrapRoot,
    /// Insert the default barrios that do not exist yet
    SeedBarrios,
    /// init-db, bootstrap-root and seed-barrios in one go
    Bootstrap,
}

impl Cli {
    /// Environment configuration with command line overrides applied
    pub fn config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::from_env()?;
        if let Some(url) = &self.database_url {
            config.database_url = url.clone();
        }
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        Ok(config)
    }
}

/// Execute the parsed command
pub async fn execute_command(cli: Cli) -> Result<()> {
    let config = cli.config()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config).await,
        Commands::InitDb => {
            init_db(&config).await?;
            Ok(())
        }
        Commands::BootstrapRoot => {
            let state = initialize_backend(&config).await?;
            bootstrap_root(&state).await
        }
        Commands::SeedBarrios => {
            let state = initialize_backend(&config).await?;
            seed_barrios(&state).await
        }
        Commands::Bootstrap => {
            init_db(&config).await?;
            let state = initialize_backend(&config).await?;
            bootstrap_root(&state).await?;
            seed_barrios(&state).await
        }
    }
}

async fn serve(config: &AppConfig) -> Result<()> {
    let state = initialize_backend(config).await?;
    let app = create_router(state, config)?;

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn init_db(config: &AppConfig) -> Result<DbConnection> {
    let db = DbConnection::new(&config.database_url).await?;
    info!("Schema ready in {}", config.database_url);
    println!("Database initialized: {}", config.database_url);
    Ok(db)
}

async fn bootstrap_root(state: &AppState) -> Result<()> {
    let account = RootAccountConfig::from_env()?;
    let role: Role = account.role.parse()?;

    let user = state
        .user_service
        .bootstrap_account(&account.username, &account.password, role)
        .await?;
    println!("Account '{}' ready with role {}", user.username, user.role);
    Ok(())
}

async fn seed_barrios(state: &AppState) -> Result<()> {
    let created = state.barrio_service.seed_defaults().await?;
    println!("Barrios inserted: {}", created);
    Ok(())
}
