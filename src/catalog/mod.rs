//! Static level/stage catalogs for the built-in games
//!
//! A catalog describes the content layout of a game (stages, levels and the
//! learning items in each level). Lock state lives in
//! [`ChildProgress`](crate::domain::ChildProgress); the catalog only provides
//! the initial layout and the reference used to repair older saves.

mod counting;
mod words;

pub use counting::COUNTING_GAME;
pub use words::LUGANDA_WORDS_GAME;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{ChildProgress, GameKey, Level, LevelId, Stage, StageId};
use crate::unlock;

/// One thing to learn: a Luganda word or number with its English meaning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningItem {
    pub luganda: String,
    pub english: String,
}

impl LearningItem {
    pub fn new(luganda: &str, english: &str) -> Self {
        Self {
            luganda: luganda.to_string(),
            english: english.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTemplate {
    pub id: LevelId,
    pub items: Vec<LearningItem>,
}

impl LevelTemplate {
    /// Build a level from `(luganda, english)` pairs
    pub fn new(id: LevelId, items: &[(&str, &str)]) -> Self {
        Self {
            id,
            items: items
                .iter()
                .map(|(luganda, english)| LearningItem::new(luganda, english))
                .collect(),
        }
    }

    pub fn word_count(&self) -> u32 {
        self.items.len() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTemplate {
    pub id: StageId,
    pub name: String,
    pub required_score: u32,
    pub levels: Vec<LevelTemplate>,
}

/// Content layout of one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCatalog {
    pub game_key: GameKey,
    pub title: String,
    /// Prefix of the progress key (`<prefix>:<child_id>`)
    pub storage_prefix: String,
    /// Field name of the stats key (`<field>_<child_id>`)
    pub stats_field: String,
    pub stages: Vec<StageTemplate>,
}

impl GameCatalog {
    /// Look up a built-in catalog
    pub fn by_key(game_key: &GameKey) -> Option<&'static GameCatalog> {
        Self::builtins()
            .into_iter()
            .find(|catalog| &catalog.game_key == game_key)
    }

    pub fn builtins() -> [&'static GameCatalog; 2] {
        [&*COUNTING_GAME, &*LUGANDA_WORDS_GAME]
    }

    pub fn stage(&self, stage_id: StageId) -> Option<&StageTemplate> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    /// Level at `index` within a stage.
    ///
    /// Out-of-range indices (from partial or malformed saves) fall back to the
    /// stage's first level. `None` only for an unknown or empty stage.
    pub fn level_at(&self, stage_id: StageId, index: usize) -> Option<&LevelTemplate> {
        let stage = self.stage(stage_id)?;
        match stage.levels.get(index) {
            Some(level) => Some(level),
            None => {
                tracing::debug!(
                    "Level index {} out of range for stage {} of {}, using first level",
                    index,
                    stage_id,
                    self.game_key
                );
                stage.levels.first()
            }
        }
    }

    /// Stage layout for a child who has never played: only the first stage
    /// and its first level are open.
    pub fn fresh_stages(&self) -> Vec<Stage> {
        self.stages
            .iter()
            .enumerate()
            .map(|(stage_idx, template)| Stage {
                id: template.id,
                name: template.name.clone(),
                required_score: template.required_score,
                is_locked: stage_idx != 0,
                levels: template
                    .levels
                    .iter()
                    .enumerate()
                    .map(|(level_idx, level)| Level {
                        id: level.id,
                        is_locked: !(stage_idx == 0 && level_idx == 0),
                        word_count: level.word_count(),
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn default_progress(&self, child_id: &str) -> ChildProgress {
        ChildProgress::new(child_id, self.fresh_stages())
    }

    /// Bring a stored record in line with the current catalog.
    ///
    /// Stages and levels are rebuilt from the catalog; a stored unlock is kept
    /// for every id that still exists. Completed sets are never shrunk. Unlocks
    /// implied by completed levels and the current score are re-applied, so a
    /// save interrupted between completion and unlock heals on the next load.
    pub fn reconcile(&self, progress: &ChildProgress) -> ChildProgress {
        let mut stages: Vec<Stage> = self
            .fresh_stages()
            .into_iter()
            .map(|mut stage| {
                if let Some(stored) = progress.stage(stage.id) {
                    stage.is_locked &= stored.is_locked;
                    for level in &mut stage.levels {
                        if let Some(stored_level) = stored.levels.iter().find(|l| l.id == level.id)
                        {
                            level.is_locked &= stored_level.is_locked;
                        }
                    }
                }
                stage
            })
            .collect();

        for template in &self.stages {
            for level in &template.levels {
                if progress.completed_levels.contains(&level.id) {
                    stages = unlock::unlock_next_level(template.id, level.id, &stages);
                }
            }
        }

        let mut completed_stages: BTreeSet<StageId> = progress.completed_stages.clone();
        completed_stages.extend(
            stages
                .iter()
                .filter(|s| unlock::is_stage_completed(s.id, &progress.completed_levels, &stages))
                .map(|s| s.id),
        );

        let reconciled = ChildProgress {
            child_id: progress.child_id.clone(),
            total_score: progress.total_score,
            completed_levels: progress.completed_levels.clone(),
            completed_stages,
            stages,
            user_stats: progress.user_stats.clone(),
        };
        unlock::recheck_stage_unlocks(&reconciled)
    }
}
