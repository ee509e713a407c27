//! Typed gameplay events used to evaluate achievement triggers

use serde::Serialize;

use super::game::GameKey;
use super::progress::{LevelId, StageId, UserStats};
use crate::error::{ProgressError, Result};

/// What happened in the game
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEventKind {
    LevelCompleted {
        level_id: LevelId,
        stage_id: StageId,
    },
    StageCompleted {
        stage_id: StageId,
    },
    LevelPerfectClear {
        level_id: LevelId,
        current_level_score: u32,
        current_level_max_score: u32,
    },
    ScoreUpdated {
        new_total_score: u32,
        user_stats: UserStats,
    },
    StatsUpdated {
        user_stats: UserStats,
    },
}

impl GameEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LevelCompleted { .. } => "level_completed",
            Self::StageCompleted { .. } => "stage_completed",
            Self::LevelPerfectClear { .. } => "level_perfect_clear",
            Self::ScoreUpdated { .. } => "score_updated",
            Self::StatsUpdated { .. } => "stats_updated",
        }
    }

    /// Stats snapshot carried by the event, if any
    pub fn user_stats(&self) -> Option<&UserStats> {
        match self {
            Self::ScoreUpdated { user_stats, .. } | Self::StatsUpdated { user_stats } => {
                Some(user_stats)
            }
            _ => None,
        }
    }
}

/// A gameplay event tagged with the game that produced it.
///
/// Built through [`GameEvent::new`] or the per-variant constructors, which
/// reject inconsistent payloads up front.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameEvent {
    game_key: GameKey,
    #[serde(flatten)]
    kind: GameEventKind,
}

impl GameEvent {
    pub fn new(game_key: GameKey, kind: GameEventKind) -> Result<Self> {
        if let GameEventKind::LevelPerfectClear {
            current_level_score,
            current_level_max_score,
            ..
        } = &kind
        {
            if *current_level_max_score == 0 {
                return Err(ProgressError::InvalidEvent(
                    "level_perfect_clear needs a non-zero max score".to_string(),
                ));
            }
            if current_level_score > current_level_max_score {
                return Err(ProgressError::InvalidEvent(format!(
                    "level score {} exceeds max score {}",
                    current_level_score, current_level_max_score
                )));
            }
        }
        Ok(Self { game_key, kind })
    }

    pub fn level_completed(game_key: GameKey, level_id: LevelId, stage_id: StageId) -> Self {
        Self {
            game_key,
            kind: GameEventKind::LevelCompleted { level_id, stage_id },
        }
    }

    pub fn stage_completed(game_key: GameKey, stage_id: StageId) -> Self {
        Self {
            game_key,
            kind: GameEventKind::StageCompleted { stage_id },
        }
    }

    pub fn level_perfect_clear(
        game_key: GameKey,
        level_id: LevelId,
        current_level_score: u32,
        current_level_max_score: u32,
    ) -> Result<Self> {
        Self::new(
            game_key,
            GameEventKind::LevelPerfectClear {
                level_id,
                current_level_score,
                current_level_max_score,
            },
        )
    }

    pub fn score_updated(game_key: GameKey, new_total_score: u32, user_stats: UserStats) -> Self {
        Self {
            game_key,
            kind: GameEventKind::ScoreUpdated {
                new_total_score,
                user_stats,
            },
        }
    }

    pub fn stats_updated(game_key: GameKey, user_stats: UserStats) -> Self {
        Self {
            game_key,
            kind: GameEventKind::StatsUpdated { user_stats },
        }
    }

    pub fn game_key(&self) -> &GameKey {
        &self.game_key
    }

    pub fn kind(&self) -> &GameEventKind {
        &self.kind
    }
}
