//! Per-child progress record
//!
//! One [`ChildProgress`] exists per `(game, child)` pair. It is a plain value:
//! the unlock functions take it by reference and hand back a new one.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type LevelId = u32;
pub type StageId = u32;

/// The smallest unlockable unit of content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub is_locked: bool,
    /// Number of learning items (words or numbers) in the level
    pub word_count: u32,
}

/// A themed group of sequential levels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    #[serde(default)]
    pub name: String,
    /// Cumulative score needed before this stage may unlock
    pub required_score: u32,
    pub is_locked: bool,
    pub levels: Vec<Level>,
}

impl Stage {
    pub fn level_ids(&self) -> impl Iterator<Item = LevelId> + '_ {
        self.levels.iter().map(|l| l.id)
    }

    pub fn contains_level(&self, level_id: LevelId) -> bool {
        self.levels.iter().any(|l| l.id == level_id)
    }
}

/// Learning statistics tracked alongside the score
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_words: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    /// Local calendar day of the last play session
    pub last_played: Option<NaiveDate>,
    pub streak_days: u32,
}

impl UserStats {
    pub fn record_answers(&mut self, correct: u32, wrong: u32) {
        self.correct_answers = self.correct_answers.saturating_add(correct);
        self.wrong_answers = self.wrong_answers.saturating_add(wrong);
    }

    pub fn record_words(&mut self, words: u32) {
        self.total_words = self.total_words.saturating_add(words);
    }

    /// Count a play session on `today` towards the daily streak.
    ///
    /// Returns true if the streak changed. A second session on the same day is
    /// not counted; a gap of more than one day restarts the streak at 1.
    pub fn record_play(&mut self, today: NaiveDate) -> bool {
        match self.last_played {
            Some(last) if last == today => return false,
            Some(last) if last.succ_opt() == Some(today) => {
                self.streak_days = self.streak_days.saturating_add(1);
            }
            _ => self.streak_days = 1,
        }
        self.last_played = Some(today);
        true
    }

    /// Share of correct answers, 0.0 when nothing was answered yet
    pub fn accuracy(&self) -> f64 {
        let total = self.correct_answers.saturating_add(self.wrong_answers);
        if total == 0 {
            0.0
        } else {
            self.correct_answers as f64 / total as f64
        }
    }
}

/// Progress of one child through one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildProgress {
    /// Owner of the record, checked on load
    pub child_id: String,
    pub total_score: u32,
    pub completed_levels: BTreeSet<LevelId>,
    #[serde(default)]
    pub completed_stages: BTreeSet<StageId>,
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub user_stats: UserStats,
}

impl ChildProgress {
    /// Fresh record for a child starting with the given stage layout
    pub fn new(child_id: impl Into<String>, stages: Vec<Stage>) -> Self {
        Self {
            child_id: child_id.into(),
            total_score: 0,
            completed_levels: BTreeSet::new(),
            completed_stages: BTreeSet::new(),
            stages,
            user_stats: UserStats::default(),
        }
    }

    pub fn stage(&self, stage_id: StageId) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    pub fn level(&self, stage_id: StageId, level_id: LevelId) -> Option<&Level> {
        self.stage(stage_id)?.levels.iter().find(|l| l.id == level_id)
    }

    pub fn is_level_completed(&self, level_id: LevelId) -> bool {
        self.completed_levels.contains(&level_id)
    }

    /// Fraction of all levels completed, for progress bars
    pub fn completion_ratio(&self) -> f64 {
        let total: usize = self.stages.iter().map(|s| s.levels.len()).sum();
        if total == 0 {
            return 0.0;
        }
        let done = self
            .stages
            .iter()
            .flat_map(|s| s.level_ids())
            .filter(|id| self.completed_levels.contains(id))
            .count();
        done as f64 / total as f64
    }
}
