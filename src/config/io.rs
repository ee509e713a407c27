//! Configuration file I/O operations

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::Config;

impl Config {
    /// Get the global config directory path (~/.essomero/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".essomero")
    }

    /// Get the global config file path (~/.essomero/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a file with atomic write and file locking.
    ///
    /// The lock file serializes concurrent writers; the temp file + rename
    /// keeps a crash from leaving a half-written config.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;
        // Lock is released when _lock is dropped
        let _lock = lock_config(path)?;
        write_atomic(path, &content)
    }

    /// Load the configuration at `path`, or the global one.
    ///
    /// A missing global config is created with defaults; a missing explicit
    /// path just yields defaults.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::from_file(path),
            Some(path) => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Self::load(),
        }
    }

    /// Load global configuration from ~/.essomero/config.toml.
    /// If no config exists, auto-creates one with defaults.
    pub fn load() -> Result<Self> {
        let global_path = Self::global_config_path();

        if !global_path.exists() {
            if let Err(e) = Self::auto_init(&global_path) {
                tracing::warn!("Failed to create default config: {}", e);
                return Ok(Self::default());
            }
        }

        Self::from_file(&global_path)
    }

    /// Write the default config unless another process got there first
    fn auto_init(config_path: &Path) -> Result<()> {
        let _lock = lock_config(config_path)?;

        // Re-check after acquiring the lock
        if config_path.exists() {
            return Ok(());
        }

        write_atomic(config_path, super::DEFAULT_CONFIG)?;
        tracing::info!("Created default config: {}", config_path.display());
        Ok(())
    }
}

/// Take the exclusive `<config>.toml.lock` lock, creating the directory
fn lock_config(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    let lock_path = path.with_extension("toml.lock");
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&lock_path)
        .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;

    // Blocks until available
    lock_file
        .lock_exclusive()
        .with_context(|| "Failed to acquire config lock")?;
    Ok(lock_file)
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("toml.tmp");
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

    temp_file
        .write_all(content.as_bytes())
        .with_context(|| "Failed to write config content")?;

    temp_file
        .sync_all()
        .with_context(|| "Failed to sync config file")?;

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename config file: {}", path.display()))?;
    Ok(())
}
