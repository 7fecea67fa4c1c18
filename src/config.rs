//! Runtime settings sourced from the environment (optionally seeded from a
//! `.env` file). Every value has a fallback so the application starts with no
//! configuration at all.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".library-manager";
/// Log file written next to the database; the terminal itself belongs to the UI.
const LOG_FILE_NAME: &str = "library-manager.log";

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_USER: &str = "root";
const DEFAULT_DATABASE: &str = "librarydb";
const DEFAULT_LOG_FILTER: &str = "info";

/// Connection and logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub user: String,
    pub password: String,
    /// Database name; becomes the SQLite file stem.
    pub database: String,
    pub data_dir: PathBuf,
    pub log_filter: String,
    /// Write the demo data set on startup when both tables are empty.
    pub seed_sample: bool,
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        // A missing `.env` is the normal case.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Empty values fall back to
    /// the defaults just like unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let data_dir = match read("LIBRARY_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        Ok(Self {
            host: read("DB_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            user: read("DB_USER").unwrap_or_else(|| DEFAULT_USER.to_string()),
            password: read("DB_PASSWORD").unwrap_or_default(),
            database: read("DB_NAME").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            data_dir,
            log_filter: read("LIBRARY_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            seed_sample: read("LIBRARY_SEED_SAMPLE").is_some_and(|value| is_truthy(&value)),
        })
    }

    /// Absolute path of the SQLite file for the configured database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.sqlite", self.database))
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// `~/.library-manager`, resolved through the platform home directory.
fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
