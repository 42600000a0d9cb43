//! Command-line interface for tictactoe_arena.

use clap::{Parser, Subcommand};

/// Tic-tac-toe arena - one shared match, everyone else watches in line
#[derive(Parser, Debug)]
#[command(name = "tictactoe_arena")]
#[command(about = "Shared tic-tac-toe match server with a spectator queue", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP/WebSocket match server
    Serve {
        /// Path to a TOML config file (defaults apply if it doesn't exist)
        #[arg(short, long, default_value = "arena.toml")]
        config: std::path::PathBuf,

        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite database path (overrides the config file)
        #[arg(long)]
        database: Option<String>,

        /// Keep the match in memory only
        #[arg(long, conflicts_with = "database")]
        ephemeral: bool,
    },
}
