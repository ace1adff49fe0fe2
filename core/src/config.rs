//! Tool configuration.
//!
//! Paths are resolved once, by the caller, into a [`Config`] that is passed
//! to every operation. Sources in increasing precedence: built-in defaults,
//! an optional YAML file, the `DB_PATH` environment variable, and finally
//! explicit command-line flags (applied by the binary).
//!
//! # Example YAML
//!
//! ```yaml
//! db_path: var/app.db
//! schema_path: db/schema.sql
//! ```

use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding the database path.
pub const DB_PATH_ENV: &str = "DB_PATH";

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "app.db";

/// Default schema document location.
pub const DEFAULT_SCHEMA_PATH: &str = "db/schema.sql";

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for [`Config`].
    #[error("invalid config '{path}': {source}")]
    YamlError {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Resolved locations for the database and the schema document.
///
/// # Examples
///
/// ```
/// use schema_sync_core::Config;
///
/// let config = Config::default().with_env(|key| {
///     (key == "DB_PATH").then(|| "/tmp/other.db".to_string())
/// });
/// assert_eq!(config.db_path.to_str(), Some("/tmp/other.db"));
/// assert_eq!(config.schema_path.to_str(), Some("db/schema.sql"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Schema document read by `apply` and written by `extract`.
    pub schema_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            schema_path: PathBuf::from(DEFAULT_SCHEMA_PATH),
        }
    }
}

impl Config {
    /// Loads configuration from a YAML file; missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be opened, or
    /// [`ConfigError::YamlError`] if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|source| ConfigError::YamlError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies environment overrides using `lookup` to read variables.
    ///
    /// Empty values are ignored.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(db_path) = lookup(DB_PATH_ENV).filter(|value| !value.is_empty()) {
            self.db_path = PathBuf::from(db_path);
        }
        self
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var(key).ok())
    }
}
