//! Configuration loading and management

mod io;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::achievements::{
    AchievementCatalog, AchievementEngine, RestAchievementCatalog, SqliteAchievementCatalog,
};
use crate::catalog::GameCatalog;
use crate::progress::{ProgressStore, SqliteKvStore};

/// Default configuration content for `essomero init`
pub const DEFAULT_CONFIG: &str = r#"# Essomero Configuration
# =======================

# ============================================================================
# STORAGE - Where progress is kept
# ============================================================================
#
# Available options:
#   data_dir - Directory for progress.db and achievements.db
#              (default: ~/.essomero/data)

[storage]
# data_dir = "/var/lib/essomero"

# ============================================================================
# ACHIEVEMENTS - Where definitions and earned awards live
# ============================================================================
#
# Available options:
#   backend      - "local" (SQLite, seeded with built-in achievements)
#                  or "remote" (PostgREST-style HTTP API)
#   remote_url   - Base URL of the REST API (remote only)
#   api_key      - Sent as `apikey` and bearer token (remote only)
#   timeout_secs - Request timeout (default: 10)

[achievements]
backend = "local"
remote_url = ""
api_key = ""
timeout_secs = 10
"#;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Local storage settings
    #[serde(default)]
    pub storage: StorageSettings,

    /// Achievement catalog settings
    #[serde(default)]
    pub achievements: AchievementSettings,
}

/// Where progress and local achievements live
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory for the SQLite files (default: ~/.essomero/data)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementBackend {
    /// SQLite catalog seeded with the built-in definitions
    #[default]
    Local,
    /// PostgREST-style HTTP API
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementSettings {
    #[serde(default)]
    pub backend: AchievementBackend,

    /// Base URL of the REST API, e.g. `https://host/rest/v1`
    #[serde(default)]
    pub remote_url: String,

    /// Sent as `apikey` and bearer token; empty disables auth headers
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for AchievementSettings {
    fn default() -> Self {
        Self {
            backend: AchievementBackend::Local,
            remote_url: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Resolved data directory
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("data"))
    }

    pub fn progress_db_path(&self) -> PathBuf {
        self.data_dir().join("progress.db")
    }

    pub fn achievements_db_path(&self) -> PathBuf {
        self.data_dir().join("achievements.db")
    }

    /// Progress store for one game, backed by the local SQLite file
    pub fn open_progress_store(&self, catalog: &GameCatalog) -> Result<ProgressStore> {
        let path = self.progress_db_path();
        let kv = SqliteKvStore::open(&path)
            .with_context(|| format!("Failed to open progress database: {}", path.display()))?;
        Ok(ProgressStore::new(Arc::new(kv), catalog.clone()))
    }

    /// Achievement catalog selected by `[achievements] backend`
    pub fn open_achievement_catalog(&self) -> Result<Arc<dyn AchievementCatalog>> {
        match self.achievements.backend {
            AchievementBackend::Local => Ok(Arc::new(self.open_local_achievements()?)),
            AchievementBackend::Remote => {
                let url = self.achievements.remote_url.trim();
                if url.is_empty() {
                    bail!(
                        "achievements.backend is \"remote\" but achievements.remote_url is empty"
                    );
                }
                Ok(Arc::new(RestAchievementCatalog::new(
                    url,
                    Some(self.achievements.api_key.clone()),
                    Duration::from_secs(self.achievements.timeout_secs),
                )))
            }
        }
    }

    /// Local achievement catalog with the built-in definitions seeded
    pub fn open_local_achievements(&self) -> Result<SqliteAchievementCatalog> {
        let path = self.achievements_db_path();
        let catalog = SqliteAchievementCatalog::open(&path).with_context(|| {
            format!("Failed to open achievements database: {}", path.display())
        })?;
        let seeded = catalog
            .seed_builtin_definitions()
            .with_context(|| "Failed to seed achievement definitions")?;
        if seeded > 0 {
            tracing::debug!("Seeded {} achievement definitions", seeded);
        }
        Ok(catalog)
    }

    pub fn open_achievement_engine(&self) -> Result<AchievementEngine> {
        Ok(AchievementEngine::new(self.open_achievement_catalog()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.achievements.backend, AchievementBackend::Local);
        assert_eq!(config.achievements.timeout_secs, 10);
    }

    #[test]
    fn test_parse_remote_backend() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            data_dir = "/tmp/essomero"

            [achievements]
            backend = "remote"
            remote_url = "https://example.test/rest/v1"
            api_key = "anon"
            "#,
        )
        .unwrap();
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/essomero"));
        assert_eq!(config.achievements.backend, AchievementBackend::Remote);
        assert_eq!(config.achievements.timeout_secs, 10);
    }

    #[test]
    fn test_remote_backend_requires_url() {
        let mut config = Config::default();
        config.achievements.backend = AchievementBackend::Remote;
        assert!(config.open_achievement_catalog().is_err());
    }

    #[tokio::test]
    async fn test_local_backend_is_seeded() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.data_dir = Some(dir.path().to_path_buf());

        let catalog = config.open_achievement_catalog().unwrap();
        let defs = catalog.fetch_achievement_definitions(None).await.unwrap();
        assert_eq!(defs.len(), crate::achievements::BUILTIN_ACHIEVEMENTS.len());
        assert!(config.achievements_db_path().exists());
    }
}
