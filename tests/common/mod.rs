//! Shared test utilities for progress flow tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;

use essomero::achievements::{AchievementEngine, SqliteAchievementCatalog};
use essomero::catalog::GameCatalog;
use essomero::config::Config;
use essomero::progress::{KeyValueStore, MemoryKvStore, ProgressStore};

/// In-memory progress store; the raw key-value store is returned too so tests
/// can plant records directly
pub fn memory_store(catalog: &GameCatalog) -> (Arc<MemoryKvStore>, ProgressStore) {
    let kv = Arc::new(MemoryKvStore::new());
    let shared: Arc<dyn KeyValueStore> = kv.clone();
    (kv, ProgressStore::new(shared, catalog.clone()))
}

/// Engine over an in-memory SQLite catalog, optionally seeded with the
/// built-in definitions
pub fn local_engine(seed: bool) -> (AchievementEngine, SqliteAchievementCatalog) {
    let catalog = SqliteAchievementCatalog::open_in_memory().expect("Failed to open catalog");
    if seed {
        catalog
            .seed_builtin_definitions()
            .expect("Failed to seed definitions");
    }
    (AchievementEngine::new(Arc::new(catalog.clone())), catalog)
}

/// Config whose data directory lives in a fresh temp dir
pub fn temp_config() -> (TempDir, Config) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = Config::default();
    config.storage.data_dir = Some(dir.path().join("data"));
    (dir, config)
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).expect("valid date")
}
