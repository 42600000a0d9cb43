//! Server configuration.

use std::path::Path;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::coordinator::{MatchPolicy, TurnPolicy};

/// Configuration for the arena server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind to.
    #[serde(default = "default_port")]
    port: u16,

    /// SQLite database holding the match.
    #[serde(default = "default_database_path")]
    database_path: String,

    /// Turn enforcement (`strict` or `permissive`).
    #[serde(default)]
    turn_policy: TurnPolicy,

    /// Zero both win counters whenever a player leaves.
    #[serde(default = "default_true")]
    reset_scores_on_player_change: bool,

    /// Carry scores over from the stored match at startup.
    #[serde(default)]
    keep_scores_on_restart: bool,
}

#[instrument]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[instrument]
fn default_port() -> u16 {
    8080
}

#[instrument]
fn default_database_path() -> String {
    "tictactoe_arena.db".to_string()
}

#[instrument]
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_path: default_database_path(),
            turn_policy: TurnPolicy::default(),
            reset_scores_on_player_change: true,
            keep_scores_on_restart: false,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on invalid TOML or unknown keys.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an existing file is unreadable or invalid.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Overrides the bind host.
    pub fn with_host(mut self, host: String) -> Self {
        self.host = host;
        self
    }

    /// Overrides the bind port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Overrides the database path.
    pub fn with_database_path(mut self, database_path: String) -> Self {
        self.database_path = database_path;
        self
    }

    /// Match rules derived from this configuration.
    pub fn match_policy(&self) -> MatchPolicy {
        MatchPolicy::new(
            self.turn_policy,
            self.reset_scores_on_player_change,
            self.keep_scores_on_restart,
        )
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {}", message)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(*config.port(), 8080);
        assert_eq!(config.match_policy(), MatchPolicy::default());
    }

    #[test]
    fn test_parse_full_file() {
        let config = ServerConfig::from_toml(
            r#"
            host = "0.0.0.0"
            port = 9000
            database_path = "/var/lib/arena.db"
            turn_policy = "permissive"
            reset_scores_on_player_change = false
            keep_scores_on_restart = true
            "#,
        )
        .unwrap();
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(config.database_path(), "/var/lib/arena.db");
        let policy = config.match_policy();
        assert_eq!(policy.turns, TurnPolicy::Permissive);
        assert!(!policy.reset_scores_on_player_change);
        assert!(policy.keep_scores_on_restart);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = ServerConfig::from_toml("prot = 1").unwrap_err();
        assert!(err.message.contains("Failed to parse config"));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::default()
            .with_host("::1".into())
            .with_port(1)
            .with_database_path("x.db".into());
        assert_eq!(config.host(), "::1");
        assert_eq!(*config.port(), 1);
        assert_eq!(config.database_path(), "x.db");
    }
}
