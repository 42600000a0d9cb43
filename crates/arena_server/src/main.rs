//! tictactoe_arena - shared tic-tac-toe match server.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use arena_server::{
    Coordinator, MatchActor, MatchStore, MemoryMatchStore, ServerConfig, SqliteMatchStore, server,
};
use clap::Parser;
use cli::{Cli, Command};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            database,
            ephemeral,
        } => run_server(config, host, port, database, ephemeral).await,
    }
}

/// Initialize tracing; `RUST_LOG` overrides the default filter.
fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,arena_server=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Run the match server until Ctrl+C.
#[instrument(skip_all, fields(config = %config_path.display()))]
async fn run_server(
    config_path: std::path::PathBuf,
    host: Option<String>,
    port: Option<u16>,
    database: Option<String>,
    ephemeral: bool,
) -> Result<()> {
    let mut config = ServerConfig::load_or_default(&config_path)?;
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(database) = database {
        config = config.with_database_path(database);
    }

    let store: Box<dyn MatchStore> = if ephemeral {
        info!("Running with an in-memory match store");
        Box::new(MemoryMatchStore::new())
    } else {
        Box::new(
            SqliteMatchStore::open(config.database_path().clone())
                .context("Match store unavailable, refusing to start")?,
        )
    };

    let coordinator = Coordinator::open(store, config.match_policy())?;
    let (handle, _actor) = MatchActor::spawn(coordinator);

    let addr = format!("{}:{}", config.host(), config.port());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, policy = ?config.match_policy(), "Starting tic-tac-toe arena");

    server::serve(listener, handle).await?;
    info!("Server stopped");
    Ok(())
}
