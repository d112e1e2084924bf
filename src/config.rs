// Reshelve - Personal Reading Tracker
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Runtime configuration
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables.
//!
//! # Environment Variables
//! - `RESHELVE_DATABASE_PATH` - SQLite database file
//! - `RESHELVE_MAX_CONNECTIONS` - connection pool size
//! - `RESHELVE_LOG` - tracing filter directive (e.g. `reshelve_core=debug`)
//!
//! # Example File
//! ```toml
//! database_path = "/var/lib/reshelve/reshelve.db"
//! max_connections = 8
//! log_filter = "info"
//! ```

use crate::error::{ReshelveError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_DATABASE_PATH: &str = "RESHELVE_DATABASE_PATH";
pub const ENV_MAX_CONNECTIONS: &str = "RESHELVE_MAX_CONNECTIONS";
pub const ENV_LOG: &str = "RESHELVE_LOG";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_path: PathBuf,
    pub max_connections: u32,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from an optional file plus the process environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file; missing keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ReshelveError::InvalidConfiguration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(toml::from_str(&text)?)
    }

    /// Apply overrides from a key lookup (the environment, in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATABASE_PATH).filter(|v| !v.trim().is_empty()) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(ENV_MAX_CONNECTIONS) {
            self.max_connections = raw.trim().parse().map_err(|_| {
                ReshelveError::InvalidConfiguration(format!(
                    "{} must be a positive integer, got '{}'",
                    ENV_MAX_CONNECTIONS, raw
                ))
            })?;
        }
        if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            self.log_filter = filter;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(ReshelveError::InvalidConfiguration(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(ReshelveError::InvalidConfiguration(
                "database_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Get default database path for the platform
///
/// - macOS: ~/Library/Application Support/Reshelve/reshelve.db
/// - Linux: ~/.local/share/Reshelve/reshelve.db
/// - Windows: %APPDATA%/Reshelve/reshelve.db
pub fn default_database_path() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join("Library")
            .join("Application Support")
            .join("Reshelve")
            .join("reshelve.db")
    }

    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("Reshelve")
            .join("reshelve.db")
    }

    #[cfg(target_os = "windows")]
    {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("Reshelve").join("reshelve.db")
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        PathBuf::from("./reshelve.db")
    }
}
