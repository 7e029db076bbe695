//! Application configuration
//!
//! Settings load from a TOML file under the platform config directory, with
//! environment overrides. Everything downstream receives the loaded value by
//! injection; nothing reads configuration globals.

pub mod repository;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "COTIZA";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite database URL.
    pub database_url: String,
    /// Scratch directory for uploaded inputs and generated workbooks.
    pub temp_dir: PathBuf,
    /// Root of the local object store.
    pub storage_dir: PathBuf,
    /// Extraction worker pool size.
    pub max_workers: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cotiza");
        Settings {
            database_url: format!("sqlite://{}", data_dir.join("cotiza.db").display()),
            temp_dir: data_dir.join("temp"),
            storage_dir: data_dir.join("storage"),
            max_workers: default_max_workers(),
        }
    }
}

/// One worker per core minus one for the runtime, never fewer than one.
pub fn default_max_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

impl Settings {
    /// Default config file location.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cotiza")
            .join("config.toml")
    }

    /// Load settings: file (when present) -> environment overrides.
    pub fn load(config_path: Option<&Path>) -> Result<Settings> {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);
        let mut settings = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Settings::default()
        };
        settings.apply_env_overrides()?;
        Ok(settings)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var(format!("{}_DATABASE_URL", ENV_PREFIX)) {
            self.database_url = url;
        }
        if let Ok(dir) = std::env::var(format!("{}_TEMP_DIR", ENV_PREFIX)) {
            self.temp_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var(format!("{}_STORAGE_DIR", ENV_PREFIX)) {
            self.storage_dir = PathBuf::from(dir);
        }
        if let Ok(workers) = std::env::var(format!("{}_MAX_WORKERS", ENV_PREFIX)) {
            self.max_workers = workers
                .parse()
                .context("COTIZA_MAX_WORKERS must be a positive integer")?;
        }
        Ok(())
    }

    /// Create the directories the process writes into.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.temp_dir, &self.storage_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        if let Some(db_path) = self.database_url.strip_prefix("sqlite://") {
            if let Some(parent) = Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create database directory: {}", parent.display())
                    })?;
                }
            }
        }
        Ok(())
    }
}
