//! Achievement trigger evaluation
//!
//! Pure functions deciding whether an event satisfies a definition. Threshold
//! triggers are level-based, not edge-based: every event past the threshold
//! satisfies them, and the earned set is what prevents a second award.

use std::collections::HashSet;

use crate::domain::{AchievementDefinition, GameEvent, GameEventKind, TriggerKind, TriggerValue};

/// Does `event` satisfy the trigger of `def`?
///
/// Unknown activity types and events without the fields a trigger needs are
/// never a match.
pub fn should_award(def: &AchievementDefinition, event: &GameEvent) -> bool {
    let Some(kind) = def.trigger_kind() else {
        return false;
    };
    let trigger = def.trigger_value.as_ref();

    match (kind, event.kind()) {
        (TriggerKind::LevelComplete, GameEventKind::LevelCompleted { level_id, .. }) => {
            trigger.is_some_and(|t| t.matches_id(*level_id))
        }
        (TriggerKind::StageComplete, GameEventKind::StageCompleted { stage_id }) => {
            trigger.is_some_and(|t| t.matches_id(*stage_id))
        }
        (TriggerKind::TotalWordsLearned, kind) => {
            reached(kind.user_stats().map(|s| s.total_words), trigger)
        }
        (TriggerKind::TotalScoreReach, GameEventKind::ScoreUpdated { new_total_score, .. }) => {
            reached(Some(*new_total_score), trigger)
        }
        (TriggerKind::StreakDays, kind) => {
            reached(kind.user_stats().map(|s| s.streak_days), trigger)
        }
        (
            TriggerKind::LevelPerfectQuiz,
            GameEventKind::LevelPerfectClear {
                level_id,
                current_level_score,
                current_level_max_score,
            },
        ) => {
            current_level_score == current_level_max_score
                && trigger.is_none_or(|t| t.matches_id(*level_id))
        }
        _ => false,
    }
}

fn reached(counter: Option<u32>, trigger: Option<&TriggerValue>) -> bool {
    match (counter, trigger.and_then(TriggerValue::as_number)) {
        (Some(value), Some(threshold)) => value as f64 >= threshold,
        _ => false,
    }
}

/// Definitions newly satisfied by `event`: scoped to the event's game (or
/// generic), not yet earned, and matching the trigger.
pub fn evaluate<'a>(
    definitions: &'a [AchievementDefinition],
    earned: &HashSet<String>,
    event: &GameEvent,
) -> Vec<&'a AchievementDefinition> {
    definitions
        .iter()
        .filter(|def| def.applies_to(event.game_key()))
        .filter(|def| !earned.contains(&def.id))
        .filter(|def| should_award(def, event))
        .collect()
}
