//! Application configuration (`config.toml`).
//!
//! ```toml
//! data_dir = "/home/ana/.local/share/todolist"
//! users_file = "users.json"
//! todos_file = "todos.json"
//! log_level = "todolist=info"
//! ```
//!
//! Every key is optional. The default data directory is the platform data
//! directory for the app (e.g. `~/.local/share/todolist` on Linux).

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "todolist";

/// Fallback data directory when no platform directories are available.
const FALLBACK_DATA_DIR: &str = ".todolist";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding both documents.
    pub data_dir: PathBuf,
    /// File name of the account document, relative to `data_dir`.
    pub users_file: String,
    /// File name of the todo document, relative to `data_dir`.
    pub todos_file: String,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            users_file: "users.json".to_string(),
            todos_file: "todos.json".to_string(),
            log_level: "todolist=info".to_string(),
        }
    }
}

impl Config {
    /// Load from `path`, or from the default config location if `path` is
    /// `None`. A missing default config file yields the defaults; a missing
    /// explicit one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_config_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.users_file.trim().is_empty() {
            bail!("users_file cannot be empty");
        }
        if self.todos_file.trim().is_empty() {
            bail!("todos_file cannot be empty");
        }
        if self.users_file == self.todos_file {
            bail!(
                "users_file and todos_file must differ (both are '{}')",
                self.users_file
            );
        }
        Ok(())
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(&self.users_file)
    }

    pub fn todos_path(&self) -> PathBuf {
        self.data_dir.join(&self.todos_file)
    }
}

/// `<platform config dir>/config.toml`, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join("config.toml"))
}

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
}
