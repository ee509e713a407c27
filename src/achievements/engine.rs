//! Achievement engine - evaluation plus award persistence
//!
//! The engine itself holds no per-child state: the caller passes the earned
//! set it already knows about, and gets back what this call granted.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::checker::evaluate;
use super::AchievementCatalog;
use crate::domain::{AchievementDefinition, ChildAchievement, GameEvent};
use crate::error::Result;

/// Result of recording an award
#[derive(Debug, Clone)]
pub struct Award {
    pub record: ChildAchievement,
    /// False when the child already had the achievement
    pub newly_earned: bool,
}

/// What one event's evaluation recorded
#[derive(Debug, Clone, Default)]
pub struct GrantOutcome {
    /// Awarded by this call
    pub granted: Vec<AchievementDefinition>,
    /// Satisfied, but the backend already held the award
    pub already_earned: Vec<String>,
}

#[derive(Clone)]
pub struct AchievementEngine {
    catalog: Arc<dyn AchievementCatalog>,
}

impl AchievementEngine {
    pub fn new(catalog: Arc<dyn AchievementCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<dyn AchievementCatalog> {
        &self.catalog
    }

    /// Ids of achievements the child has earned; empty if the catalog is
    /// unreachable
    pub async fn earned_ids(&self, child_id: &str) -> HashSet<String> {
        match self.catalog.fetch_earned_achievements(child_id).await {
            Ok(earned) => earned.into_iter().map(|a| a.achievement_id).collect(),
            Err(e) => {
                warn!("Failed to fetch earned achievements for {}: {}", child_id, e);
                HashSet::new()
            }
        }
    }

    /// Record an award, treating an existing award as success.
    pub async fn award(&self, child_id: &str, achievement_id: &str) -> Result<Award> {
        match self
            .catalog
            .insert_earned_achievement(child_id, achievement_id)
            .await
        {
            Ok(record) => Ok(Award {
                record,
                newly_earned: true,
            }),
            Err(e) if e.is_duplicate_award() => {
                debug!("{} already has {}", child_id, achievement_id);
                let existing = match self.catalog.fetch_earned_achievements(child_id).await {
                    Ok(earned) => earned.into_iter().find(|a| a.achievement_id == achievement_id),
                    Err(fetch) => {
                        debug!("Could not load existing award {}: {}", achievement_id, fetch);
                        None
                    }
                };
                match existing {
                    Some(record) => Ok(Award {
                        record,
                        newly_earned: false,
                    }),
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Evaluate `event` and persist every newly satisfied achievement.
    ///
    /// Catalog fetch failures are returned; individual award failures are
    /// logged and that achievement is left out of the result. Achievements the
    /// backend reports as already earned land in
    /// [`already_earned`](GrantOutcome::already_earned), never in `granted`, so
    /// their points are counted once.
    pub async fn try_check_and_grant(
        &self,
        child_id: &str,
        earned: &HashSet<String>,
        event: &GameEvent,
    ) -> Result<GrantOutcome> {
        let definitions = self
            .catalog
            .fetch_achievement_definitions(Some(event.game_key()))
            .await?;

        let candidates: Vec<AchievementDefinition> = evaluate(&definitions, earned, event)
            .into_iter()
            .cloned()
            .collect();

        let mut outcome = GrantOutcome::default();
        for def in candidates {
            match self.award(child_id, &def.id).await {
                Ok(Award {
                    newly_earned: true, ..
                }) => {
                    info!(
                        "{} earned '{}' (+{} points) on {}",
                        child_id,
                        def.name,
                        def.points,
                        event.kind().as_str()
                    );
                    outcome.granted.push(def);
                }
                Ok(_) => outcome.already_earned.push(def.id),
                Err(e) if e.is_duplicate_award() => outcome.already_earned.push(def.id),
                Err(e) => warn!("Failed to award {} to {}: {}", def.id, child_id, e),
            }
        }
        Ok(outcome)
    }

    /// Fail-open variant of [`try_check_and_grant`](Self::try_check_and_grant):
    /// any error means "no achievement this event".
    pub async fn check_and_grant(
        &self,
        child_id: &str,
        earned: &HashSet<String>,
        event: &GameEvent,
    ) -> GrantOutcome {
        match self.try_check_and_grant(child_id, earned, event).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    "Achievement check for {} on {} failed: {}",
                    child_id,
                    event.kind().as_str(),
                    e
                );
                GrantOutcome::default()
            }
        }
    }

    /// Achievements newly granted for `event`; see [`check_and_grant`](Self::check_and_grant)
    pub async fn check_and_grant_new_achievements(
        &self,
        child_id: &str,
        earned: &HashSet<String>,
        event: &GameEvent,
    ) -> Vec<AchievementDefinition> {
        self.check_and_grant(child_id, earned, event).await.granted
    }
}

/// Total points of a list of granted achievements
pub fn total_points(granted: &[AchievementDefinition]) -> u32 {
    granted.iter().fold(0u32, |acc, d| acc.saturating_add(d.points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::SqliteAchievementCatalog;
    use crate::domain::{GameKey, TriggerValue, UserStats};
    use crate::error::ProgressError;

    use async_trait::async_trait;

    fn definition(
        id: &str,
        activity_type: &str,
        trigger: f64,
        game: Option<GameKey>,
    ) -> AchievementDefinition {
        AchievementDefinition {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            icon: String::new(),
            activity_type: activity_type.to_string(),
            points: 10,
            trigger_value: Some(TriggerValue::Number(trigger)),
            game_key: game,
        }
    }

    fn engine_with(
        defs: &[AchievementDefinition],
    ) -> (AchievementEngine, SqliteAchievementCatalog) {
        let catalog = SqliteAchievementCatalog::open_in_memory().unwrap();
        for def in defs {
            catalog.upsert_definition(def).unwrap();
        }
        (AchievementEngine::new(Arc::new(catalog.clone())), catalog)
    }

    #[tokio::test]
    async fn test_same_event_twice_grants_once() {
        let game = GameKey::luganda_words();
        let (engine, _) = engine_with(&[definition(
            "lvl2",
            "language_level_complete",
            2.0,
            Some(game.clone()),
        )]);
        let event = GameEvent::level_completed(game, 2, 1);

        let mut earned = engine.earned_ids("child-1").await;
        let first = engine
            .check_and_grant_new_achievements("child-1", &earned, &event)
            .await;
        assert_eq!(first.len(), 1);
        earned.extend(first.iter().map(|d| d.id.clone()));

        let second = engine
            .check_and_grant_new_achievements("child-1", &earned, &event)
            .await;
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_stale_earned_set_does_not_double_grant() {
        let game = GameKey::counting();
        let (engine, _) = engine_with(&[definition("s100", "total_score_reach", 100.0, None)]);
        let event = GameEvent::score_updated(game, 120, UserStats::default());

        let stale = HashSet::new();
        let first = engine.check_and_grant_new_achievements("c", &stale, &event).await;
        let second = engine.check_and_grant_new_achievements("c", &stale, &event).await;
        assert_eq!(first.len(), 1);
        // The backend reports a duplicate, which is not a new grant.
        assert!(second.is_empty());
        assert_eq!(total_points(&first) + total_points(&second), 10);
    }

    #[tokio::test]
    async fn test_other_games_definitions_ignored() {
        let (engine, _) = engine_with(&[definition(
            "words_lvl1",
            "level_complete",
            1.0,
            Some(GameKey::luganda_words()),
        )]);
        let event = GameEvent::level_completed(GameKey::counting(), 1, 1);
        let granted = engine
            .check_and_grant_new_achievements("c", &HashSet::new(), &event)
            .await;
        assert!(granted.is_empty());
    }

    #[tokio::test]
    async fn test_award_is_idempotent() {
        let (engine, _) = engine_with(&[]);
        let first = engine.award("c", "streak_3").await.unwrap();
        let again = engine.award("c", "streak_3").await.unwrap();
        assert!(first.newly_earned);
        assert!(!again.newly_earned);
        assert_eq!(first.record.id, again.record.id);
    }

    #[tokio::test]
    async fn test_existing_award_reported_as_already_earned() {
        let (engine, catalog) =
            engine_with(&[definition("s100", "total_score_reach", 100.0, None)]);
        catalog.insert_earned_achievement("c", "s100").await.unwrap();
        let event = GameEvent::score_updated(GameKey::counting(), 150, UserStats::default());

        let outcome = engine.check_and_grant("c", &HashSet::new(), &event).await;
        assert!(outcome.granted.is_empty());
        assert_eq!(outcome.already_earned, vec!["s100".to_string()]);
    }

    struct OfflineCatalog;

    #[async_trait]
    impl AchievementCatalog for OfflineCatalog {
        async fn fetch_achievement_definitions(
            &self,
            _game_key: Option<&GameKey>,
        ) -> Result<Vec<AchievementDefinition>> {
            Err(ProgressError::Transport("offline".into()))
        }

        async fn fetch_earned_achievements(
            &self,
            _child_id: &str,
        ) -> Result<Vec<ChildAchievement>> {
            Err(ProgressError::Transport("offline".into()))
        }

        async fn insert_earned_achievement(
            &self,
            _child_id: &str,
            _achievement_id: &str,
        ) -> Result<ChildAchievement> {
            Err(ProgressError::Transport("offline".into()))
        }
    }

    #[tokio::test]
    async fn test_offline_catalog_is_fail_open() {
        let engine = AchievementEngine::new(Arc::new(OfflineCatalog));
        let event = GameEvent::stage_completed(GameKey::counting(), 1);
        assert!(engine.earned_ids("c").await.is_empty());
        assert!(engine
            .check_and_grant_new_achievements("c", &HashSet::new(), &event)
            .await
            .is_empty());
        assert!(engine.try_check_and_grant("c", &HashSet::new(), &event).await.is_err());
    }
}
