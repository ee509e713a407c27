//! Game session - one child playing one game
//!
//! Owns the session-scoped state a game screen would otherwise keep globally
//! (the loaded progress and the earned-achievement set) and runs a level
//! completion in strict order:
//!
//! 1. unlock computation
//! 2. persist progress
//! 3. build events
//! 4. evaluate achievements, persisting each award
//! 5. add awarded points, re-check stage unlocks, persist the final score
//!
//! `&mut self` on every mutating call keeps one completion in flight per
//! session.

use std::collections::HashSet;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::achievements::{total_points, AchievementEngine};
use crate::domain::{AchievementDefinition, ChildProgress, GameEvent, LevelId, StageId};
use crate::progress::ProgressStore;
use crate::unlock;

/// What happened in a finished level, as reported by the game screen
#[derive(Debug, Clone)]
pub struct LevelOutcome {
    /// Points scored in this level
    pub score: u32,
    pub max_score: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    /// Words learned; defaults to the level's word count on first completion
    pub words_learned: Option<u32>,
    pub played_on: NaiveDate,
}

impl LevelOutcome {
    pub fn new(score: u32, max_score: u32) -> Self {
        Self {
            score,
            max_score,
            correct_answers: 0,
            wrong_answers: 0,
            words_learned: None,
            played_on: Local::now().date_naive(),
        }
    }

    pub fn with_answers(mut self, correct: u32, wrong: u32) -> Self {
        self.correct_answers = correct;
        self.wrong_answers = wrong;
        self
    }

    pub fn with_words(mut self, words: u32) -> Self {
        self.words_learned = Some(words);
        self
    }

    pub fn on(mut self, day: NaiveDate) -> Self {
        self.played_on = day;
        self
    }

    pub fn is_perfect(&self) -> bool {
        self.max_score > 0 && self.score == self.max_score
    }
}

/// Everything a screen needs to show after a level
#[derive(Debug, Clone)]
pub struct CompletionReport {
    pub progress: ChildProgress,
    pub first_completion: bool,
    pub unlocked_level: Option<LevelId>,
    /// Set the first time the stage is completed
    pub completed_stage: Option<StageId>,
    pub unlocked_stages: Vec<StageId>,
    /// In award order, for one-at-a-time notifications
    pub new_achievements: Vec<AchievementDefinition>,
    pub achievement_points: u32,
    /// Total score before achievement points
    pub base_score: u32,
    /// False if any save in the flow failed
    pub persisted: bool,
}

/// Result of a score change outside a level completion
#[derive(Debug, Clone)]
pub struct ScoreReport {
    pub total_score: u32,
    pub unlocked_stages: Vec<StageId>,
    pub new_achievements: Vec<AchievementDefinition>,
    pub persisted: bool,
}

pub struct GameSession {
    store: ProgressStore,
    engine: AchievementEngine,
    child_id: String,
    progress: ChildProgress,
    earned: HashSet<String>,
}

impl GameSession {
    /// Load the child's progress and earned achievements (both fail-open)
    pub async fn start(
        store: ProgressStore,
        engine: AchievementEngine,
        child_id: impl Into<String>,
    ) -> Self {
        let child_id = child_id.into();
        let progress = store.load(&child_id);
        let earned = engine.earned_ids(&child_id).await;
        debug!(
            "Session for {} in {}: score {}, {} achievements",
            child_id,
            store.game_key(),
            progress.total_score,
            earned.len()
        );
        Self {
            store,
            engine,
            child_id,
            progress,
            earned,
        }
    }

    pub fn child_id(&self) -> &str {
        &self.child_id
    }

    pub fn progress(&self) -> &ChildProgress {
        &self.progress
    }

    pub fn earned(&self) -> &HashSet<String> {
        &self.earned
    }

    /// Run the full completion flow for one level.
    ///
    /// Returns `None` (and changes nothing) for an unknown or locked level.
    pub async fn complete_level(
        &mut self,
        stage_id: StageId,
        level_id: LevelId,
        outcome: LevelOutcome,
    ) -> Option<CompletionReport> {
        let game_key = self.store.game_key().clone();
        let word_count = self.progress.level(stage_id, level_id)?.word_count;

        let Some(completion) =
            unlock::apply_level_completion(&self.progress, stage_id, level_id, outcome.score)
        else {
            debug!(
                "Level {} of stage {} not playable for {}",
                level_id, stage_id, self.child_id
            );
            return None;
        };

        let mut progress = completion.progress;
        let stats = &mut progress.user_stats;
        stats.record_answers(outcome.correct_answers, outcome.wrong_answers);
        stats.record_play(outcome.played_on);
        match outcome.words_learned {
            Some(words) => stats.record_words(words),
            None if completion.first_completion => stats.record_words(word_count),
            None => {}
        }

        let mut persisted = self.store.save(&self.child_id, &progress);

        let mut events = vec![GameEvent::level_completed(game_key.clone(), level_id, stage_id)];
        if let Some(stage) = completion.completed_stage {
            events.push(GameEvent::stage_completed(game_key.clone(), stage));
        }
        if outcome.is_perfect() {
            match GameEvent::level_perfect_clear(
                game_key.clone(),
                level_id,
                outcome.score,
                outcome.max_score,
            ) {
                Ok(event) => events.push(event),
                Err(e) => debug!("Skipping perfect-clear event: {}", e),
            }
        }
        let base_score = progress.total_score;
        events.push(GameEvent::score_updated(
            game_key.clone(),
            base_score,
            progress.user_stats.clone(),
        ));
        events.push(GameEvent::stats_updated(game_key, progress.user_stats.clone()));

        let new_achievements = self.grant_all(&events).await;
        let achievement_points = total_points(&new_achievements);

        let stages_before = self.progress.stages.clone();
        if achievement_points > 0 {
            progress.total_score = progress.total_score.saturating_add(achievement_points);
            progress = unlock::recheck_stage_unlocks(&progress);
            persisted &= self.store.save(&self.child_id, &progress);
        }
        let unlocked_stages = unlock::newly_unlocked_stages(&stages_before, &progress.stages);

        info!(
            "{} completed level {} (stage {}) in {}: score {} (+{} from achievements)",
            self.child_id,
            level_id,
            stage_id,
            self.store.game_key(),
            progress.total_score,
            achievement_points
        );

        self.progress = progress.clone();
        Some(CompletionReport {
            progress,
            first_completion: completion.first_completion,
            unlocked_level: completion.unlocked_level,
            completed_stage: completion.completed_stage,
            unlocked_stages,
            new_achievements,
            achievement_points,
            base_score,
            persisted,
        })
    }

    /// Apply a score increase that is not a level completion (bonus rounds,
    /// quizzes) and unlock any stage whose threshold is now met.
    pub async fn add_points(&mut self, points: u32) -> ScoreReport {
        let game_key = self.store.game_key().clone();
        let stages_before = self.progress.stages.clone();

        let mut progress = self.progress.clone();
        progress.total_score = progress.total_score.saturating_add(points);

        let event = GameEvent::score_updated(
            game_key,
            progress.total_score,
            progress.user_stats.clone(),
        );
        let new_achievements = self.grant_all(std::slice::from_ref(&event)).await;
        progress.total_score = progress
            .total_score
            .saturating_add(total_points(&new_achievements));
        progress = unlock::recheck_stage_unlocks(&progress);

        let persisted = self.store.save(&self.child_id, &progress);
        let unlocked_stages = unlock::newly_unlocked_stages(&stages_before, &progress.stages);
        let total_score = progress.total_score;
        self.progress = progress;

        ScoreReport {
            total_score,
            unlocked_stages,
            new_achievements,
            persisted,
        }
    }

    /// Delete the child's progress for this game and start over
    pub fn reset(&mut self) -> bool {
        let removed = self.store.reset(&self.child_id);
        self.progress = self.store.catalog().default_progress(&self.child_id);
        removed
    }

    /// Evaluate events in order; each sees the awards of the ones before it
    async fn grant_all(&mut self, events: &[GameEvent]) -> Vec<AchievementDefinition> {
        let mut granted = Vec::new();
        for event in events {
            let outcome = self
                .engine
                .check_and_grant(&self.child_id, &self.earned, event)
                .await;
            self.earned.extend(outcome.granted.iter().map(|d| d.id.clone()));
            self.earned.extend(outcome.already_earned);
            granted.extend(outcome.granted);
        }
        granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::achievements::{builtin_definitions, AchievementCatalog, SqliteAchievementCatalog};
    use crate::domain::{ChildAchievement, GameKey};
    use crate::error::{ProgressError, Result};
    use crate::catalog::{COUNTING_GAME, LUGANDA_WORDS_GAME};
    use crate::progress::MemoryKvStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    async fn session(catalog: &crate::catalog::GameCatalog, seed: bool) -> GameSession {
        let kv = Arc::new(MemoryKvStore::new());
        let store = ProgressStore::new(kv, catalog.clone());
        let achievements = SqliteAchievementCatalog::open_in_memory().unwrap();
        if seed {
            achievements.seed_builtin_definitions().unwrap();
        }
        let engine = AchievementEngine::new(Arc::new(achievements));
        GameSession::start(store, engine, "child-1").await
    }

    #[tokio::test]
    async fn test_first_level_without_achievements() {
        let mut session = session(&COUNTING_GAME, false).await;
        let report = session
            .complete_level(1, 1, LevelOutcome::new(10, 30).with_answers(1, 2).on(day(1)))
            .await
            .unwrap();

        assert!(report.first_completion);
        assert_eq!(report.unlocked_level, Some(2));
        assert_eq!(report.completed_stage, None);
        assert!(report.new_achievements.is_empty());
        assert_eq!(report.progress.total_score, 10);
        assert_eq!(report.progress.user_stats.total_words, 3);
        assert_eq!(report.progress.user_stats.streak_days, 1);
        assert!(report.persisted);
    }

    #[tokio::test]
    async fn test_locked_level_is_rejected() {
        let mut session = session(&COUNTING_GAME, false).await;
        assert!(session
            .complete_level(2, 3, LevelOutcome::new(10, 10))
            .await
            .is_none());
        assert_eq!(session.progress().total_score, 0);
    }

    #[tokio::test]
    async fn test_achievement_points_added_once() {
        let mut session = session(&LUGANDA_WORDS_GAME, true).await;
        let report = session
            .complete_level(1, 1, LevelOutcome::new(20, 30).on(day(1)))
            .await
            .unwrap();
        // language_first_words (+10)
        let ids: Vec<&str> = report.new_achievements.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["language_first_words"]);
        assert_eq!(report.base_score, 20);
        assert_eq!(report.progress.total_score, 30);

        // Replaying grants nothing new.
        let replay = session
            .complete_level(1, 1, LevelOutcome::new(20, 30).on(day(1)))
            .await
            .unwrap();
        assert!(replay.new_achievements.is_empty());
        assert_eq!(replay.progress.total_score, 50);
    }

    #[tokio::test]
    async fn test_achievement_points_can_unlock_next_stage() {
        let mut session = session(&LUGANDA_WORDS_GAME, true).await;
        session
            .complete_level(1, 1, LevelOutcome::new(30, 30).on(day(1)))
            .await
            .unwrap();
        let report = session
            .complete_level(1, 2, LevelOutcome::new(10, 30).on(day(1)))
            .await
            .unwrap();
        // Base score below 100, but stage + level awards push it over.
        assert!(report.base_score < 100);
        assert_eq!(report.completed_stage, Some(1));
        assert!(report.progress.total_score >= 100);
        assert_eq!(report.unlocked_stages, vec![2]);
        assert!(!report.progress.level(2, 3).unwrap().is_locked);
    }

    #[tokio::test]
    async fn test_add_points_unlocks_completed_stage_successor() {
        let mut session = session(&COUNTING_GAME, false).await;
        for level in [1, 2] {
            session
                .complete_level(1, level, LevelOutcome::new(10, 10).on(day(1)))
                .await
                .unwrap();
        }
        assert!(session.progress().stage(2).unwrap().is_locked);

        let report = session.add_points(80).await;
        assert_eq!(report.total_score, 100);
        assert_eq!(report.unlocked_stages, vec![2]);
    }

    /// Catalog whose earned-list endpoint is down; inserts still work
    struct NoEarnedList {
        inner: SqliteAchievementCatalog,
        inserts: AtomicUsize,
    }

    #[async_trait]
    impl AchievementCatalog for NoEarnedList {
        async fn fetch_achievement_definitions(
            &self,
            game_key: Option<&GameKey>,
        ) -> Result<Vec<AchievementDefinition>> {
            self.inner.fetch_achievement_definitions(game_key).await
        }

        async fn fetch_earned_achievements(
            &self,
            _child_id: &str,
        ) -> Result<Vec<ChildAchievement>> {
            Err(ProgressError::Transport("connection reset".into()))
        }

        async fn insert_earned_achievement(
            &self,
            child_id: &str,
            achievement_id: &str,
        ) -> Result<ChildAchievement> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            self.inner
                .insert_earned_achievement(child_id, achievement_id)
                .await
        }
    }

    #[tokio::test]
    async fn test_existing_award_joins_earned_set() {
        let inner = SqliteAchievementCatalog::open_in_memory().unwrap();
        let first_level = builtin_definitions()
            .into_iter()
            .find(|d| d.id == "counting_first_level")
            .unwrap();
        inner.upsert_definition(&first_level).unwrap();
        inner
            .insert_earned_achievement("child-1", "counting_first_level")
            .await
            .unwrap();
        let catalog = Arc::new(NoEarnedList {
            inner,
            inserts: AtomicUsize::new(0),
        });

        let store = ProgressStore::new(Arc::new(MemoryKvStore::new()), COUNTING_GAME.clone());
        let engine = AchievementEngine::new(catalog.clone());
        let mut session = GameSession::start(store, engine, "child-1").await;
        assert!(session.earned().is_empty());

        let report = session
            .complete_level(1, 1, LevelOutcome::new(10, 10).on(day(1)))
            .await
            .unwrap();
        assert!(report.new_achievements.is_empty());
        assert_eq!(report.progress.total_score, 10);
        assert!(session.earned().contains("counting_first_level"));
        assert_eq!(catalog.inserts.load(Ordering::SeqCst), 1);

        // Known as earned now: no further insert attempts.
        let replay = session
            .complete_level(1, 1, LevelOutcome::new(10, 10).on(day(2)))
            .await
            .unwrap();
        assert!(replay.new_achievements.is_empty());
        assert_eq!(catalog.inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reset_returns_to_defaults() {
        let mut session = session(&COUNTING_GAME, false).await;
        session
            .complete_level(1, 1, LevelOutcome::new(10, 10))
            .await
            .unwrap();
        assert!(session.reset());
        assert_eq!(session.progress(), &COUNTING_GAME.default_progress("child-1"));
    }
}
