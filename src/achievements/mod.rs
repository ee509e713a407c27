//! Achievement engine and catalog backends
//!
//! Each `(child, achievement)` pair is either not earned or earned; earning is
//! terminal. The catalog backend enforces that with a uniqueness constraint on
//! `(child_id, achievement_id)`, and the engine treats a duplicate insert as a
//! successful no-op.

mod checker;
mod definitions;
mod engine;
mod local;
mod remote;

pub use checker::{evaluate, should_award};
pub use definitions::{builtin_definitions, BuiltinAchievement, BUILTIN_ACHIEVEMENTS};
pub use engine::{total_points, AchievementEngine, Award, GrantOutcome};
pub use local::SqliteAchievementCatalog;
pub use remote::RestAchievementCatalog;

use async_trait::async_trait;

use crate::domain::{AchievementDefinition, ChildAchievement, GameKey};
use crate::error::Result;

/// Source of achievement definitions and store of earned awards
#[async_trait]
pub trait AchievementCatalog: Send + Sync {
    /// Definitions for `game_key` plus the generic ones; all when `None`
    async fn fetch_achievement_definitions(
        &self,
        game_key: Option<&GameKey>,
    ) -> Result<Vec<AchievementDefinition>>;

    async fn fetch_earned_achievements(&self, child_id: &str) -> Result<Vec<ChildAchievement>>;

    /// Record an award.
    ///
    /// Fails with [`ProgressError::DuplicateAward`](crate::error::ProgressError::DuplicateAward)
    /// if the child already has it.
    async fn insert_earned_achievement(
        &self,
        child_id: &str,
        achievement_id: &str,
    ) -> Result<ChildAchievement>;
}
