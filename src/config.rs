//! Configuration module for dbdrive.

use serde::Deserialize;
use std::path::Path;

use crate::db::Relation;
use crate::{DriveError, Result};

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/dbdrive.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Drive configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveConfig {
    /// Name of the relation holding file records.
    #[serde(default = "default_relation")]
    pub relation: String,
    /// Tree partition served by this drive. Also the id of its root folder.
    #[serde(default = "default_tree_id")]
    pub tree_id: i64,
    /// Directory holding content blobs.
    #[serde(default = "default_content_path")]
    pub content_path: String,
}

fn default_relation() -> String {
    "files".to_string()
}

fn default_tree_id() -> i64 {
    1
}

fn default_content_path() -> String {
    "data/content".to_string()
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            relation: default_relation(),
            tree_id: default_tree_id(),
            content_path: default_content_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/dbdrive.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Drive configuration.
    #[serde(default)]
    pub drive: DriveConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| DriveError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| DriveError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `DBDRIVE_DATABASE_PATH`: Override the database file path
    /// - `DBDRIVE_CONTENT_PATH`: Override the blob directory
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("DBDRIVE_DATABASE_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
        if let Ok(path) = std::env::var("DBDRIVE_CONTENT_PATH") {
            if !path.is_empty() {
                self.drive.content_path = path;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The relation name is not a plain SQL identifier
    /// - The tree id is not positive
    pub fn validate(&self) -> Result<()> {
        Relation::new(&self.drive.relation)
            .map_err(|e| DriveError::Config(format!("drive.relation: {e}")))?;
        if self.drive.tree_id <= 0 {
            return Err(DriveError::Config(format!(
                "drive.tree_id must be positive, got {}",
                self.drive.tree_id
            )));
        }
        Ok(())
    }
}
