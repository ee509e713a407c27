//! Progress store
//!
//! Persists one [`ChildProgress`] per `(game, child)` as JSON under
//! `<storage_prefix>:<child_id>`, plus a standalone [`UserStats`] copy under
//! `<stats_field>_<child_id>`.
//!
//! Loading is fail-open: a missing, unreadable, unparseable or foreign record
//! (stored `child_id` differs from the requested one) yields the catalog's
//! default progress, so a storage problem never keeps a child from playing.

mod kv;

pub use kv::{KeyValueStore, MemoryKvStore, SqliteKvStore};

use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::GameCatalog;
use crate::domain::{ChildProgress, GameKey, UserStats};
use crate::error::Result;

/// Reads and writes progress records for one game
#[derive(Clone)]
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
    catalog: GameCatalog,
}

impl ProgressStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, catalog: GameCatalog) -> Self {
        Self { kv, catalog }
    }

    pub fn catalog(&self) -> &GameCatalog {
        &self.catalog
    }

    pub fn game_key(&self) -> &GameKey {
        &self.catalog.game_key
    }

    pub fn progress_key(&self, child_id: &str) -> String {
        format!("{}:{}", self.catalog.storage_prefix, child_id)
    }

    pub fn stats_key(&self, child_id: &str) -> String {
        format!("{}_{}", self.catalog.stats_field, child_id)
    }

    // ========================================
    // FALLIBLE OPERATIONS
    // ========================================

    /// Raw record stored for `child_id`, without ownership checks
    pub fn try_load(&self, child_id: &str) -> Result<Option<ChildProgress>> {
        let Some(json) = self.kv.get(&self.progress_key(child_id))? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    pub fn try_save(&self, child_id: &str, progress: &ChildProgress) -> Result<()> {
        let mut record = progress.clone();
        record.child_id = child_id.to_string();

        let json = serde_json::to_string(&record)?;
        self.kv.set(&self.progress_key(child_id), &json)?;

        let stats = serde_json::to_string(&record.user_stats)?;
        self.kv.set(&self.stats_key(child_id), &stats)?;
        Ok(())
    }

    pub fn try_reset(&self, child_id: &str) -> Result<()> {
        self.kv.remove(&self.progress_key(child_id))?;
        self.kv.remove(&self.stats_key(child_id))?;
        Ok(())
    }

    pub fn try_load_user_stats(&self, child_id: &str) -> Result<Option<UserStats>> {
        let Some(json) = self.kv.get(&self.stats_key(child_id))? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    // ========================================
    // FAIL-OPEN OPERATIONS
    // ========================================

    /// Progress for `child_id`, or the default record if none can be used
    pub fn load(&self, child_id: &str) -> ChildProgress {
        match self.try_load(child_id) {
            Ok(Some(progress)) if progress.child_id == child_id => {
                self.catalog.reconcile(&progress)
            }
            Ok(Some(progress)) => {
                warn!(
                    "Progress under {} belongs to {}, not {}; starting fresh",
                    self.progress_key(child_id),
                    progress.child_id,
                    child_id
                );
                self.catalog.default_progress(child_id)
            }
            Ok(None) => {
                debug!("No {} progress for {}", self.catalog.game_key, child_id);
                self.catalog.default_progress(child_id)
            }
            Err(e) => {
                warn!(
                    "Failed to load {} progress for {}: {}",
                    self.catalog.game_key, child_id, e
                );
                self.catalog.default_progress(child_id)
            }
        }
    }

    /// Persist progress; failures are logged and reported as `false`
    pub fn save(&self, child_id: &str, progress: &ChildProgress) -> bool {
        match self.try_save(child_id, progress) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "Failed to save {} progress for {}: {}",
                    self.catalog.game_key, child_id, e
                );
                false
            }
        }
    }

    /// Delete the child's record; the next `load` returns defaults
    pub fn reset(&self, child_id: &str) -> bool {
        match self.try_reset(child_id) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "Failed to reset {} progress for {}: {}",
                    self.catalog.game_key, child_id, e
                );
                false
            }
        }
    }

    /// Stats saved for `child_id`, falling back to the stats inside the
    /// progress record and then to empty stats
    pub fn load_user_stats(&self, child_id: &str) -> UserStats {
        match self.try_load_user_stats(child_id) {
            Ok(Some(stats)) => stats,
            Ok(None) => self.load(child_id).user_stats,
            Err(e) => {
                warn!("Failed to load user stats for {}: {}", child_id, e);
                self.load(child_id).user_stats
            }
        }
    }
}
