//! Unlock engine
//!
//! Pure transforms over stage layouts and progress records. Every function
//! borrows its input and returns a new value; nothing here touches storage.
//!
//! Stage unlocking is conjunctive: the previous stage must be fully completed
//! *and* the total score must reach the next stage's `required_score`, both
//! evaluated against the same progress snapshot.

use std::collections::BTreeSet;

use crate::domain::{ChildProgress, LevelId, Stage, StageId};

/// Unlock the level that follows `completed_level_id` in the given stage.
///
/// No-op when the stage or level is unknown or the level is the stage's last.
pub fn unlock_next_level(
    stage_id: StageId,
    completed_level_id: LevelId,
    stages: &[Stage],
) -> Vec<Stage> {
    let mut next = stages.to_vec();
    let Some(stage) = next.iter_mut().find(|s| s.id == stage_id) else {
        return next;
    };
    let Some(pos) = stage.levels.iter().position(|l| l.id == completed_level_id) else {
        return next;
    };
    if let Some(level) = stage.levels.get_mut(pos + 1) {
        level.is_locked = false;
    }
    next
}

/// True iff every level of the stage is in `completed_levels`.
///
/// Unknown and empty stages are never completed.
pub fn is_stage_completed(
    stage_id: StageId,
    completed_levels: &BTreeSet<LevelId>,
    stages: &[Stage],
) -> bool {
    stages
        .iter()
        .find(|s| s.id == stage_id)
        .is_some_and(|stage| {
            !stage.levels.is_empty() && stage.level_ids().all(|id| completed_levels.contains(&id))
        })
}

/// Unlock stage `completed_stage_id + 1` and its first level.
///
/// Leaves everything locked when there is no such stage or when
/// `total_score` is below its `required_score`.
pub fn unlock_next_stage(
    completed_stage_id: StageId,
    total_score: u32,
    stages: &[Stage],
) -> Vec<Stage> {
    let mut next = stages.to_vec();
    let Some(next_id) = completed_stage_id.checked_add(1) else {
        return next;
    };
    let Some(stage) = next.iter_mut().find(|s| s.id == next_id) else {
        return next;
    };
    if total_score < stage.required_score {
        tracing::debug!(
            "Stage {} needs {} points, have {}",
            next_id,
            stage.required_score,
            total_score
        );
        return next;
    }
    stage.is_locked = false;
    if let Some(first) = stage.levels.first_mut() {
        first.is_locked = false;
    }
    next
}

/// Outcome of applying one level completion
#[derive(Debug, Clone)]
pub struct LevelCompletion {
    pub progress: ChildProgress,
    /// False when the level had been completed before
    pub first_completion: bool,
    pub unlocked_level: Option<LevelId>,
    /// Set only the first time the stage becomes complete
    pub completed_stage: Option<StageId>,
    pub unlocked_stage: Option<StageId>,
}

/// Apply a level completion worth `points` to a progress record.
///
/// Adds the points, records the level, unlocks the next level, and unlocks the
/// next stage when the stage is now complete and the new total reaches its
/// threshold. Returns `None` for an unknown or still-locked level.
pub fn apply_level_completion(
    progress: &ChildProgress,
    stage_id: StageId,
    level_id: LevelId,
    points: u32,
) -> Option<LevelCompletion> {
    let level = progress.level(stage_id, level_id)?;
    let stage_locked = progress.stage(stage_id).is_some_and(|s| s.is_locked);
    if level.is_locked || stage_locked {
        tracing::debug!(
            "Ignoring completion of locked level {} in stage {}",
            level_id,
            stage_id
        );
        return None;
    }

    let mut next = progress.clone();
    next.total_score = next.total_score.saturating_add(points);
    let first_completion = next.completed_levels.insert(level_id);
    next.stages = unlock_next_level(stage_id, level_id, &next.stages);

    let mut completed_stage = None;
    if is_stage_completed(stage_id, &next.completed_levels, &next.stages) {
        if next.completed_stages.insert(stage_id) {
            completed_stage = Some(stage_id);
        }
        next.stages = unlock_next_stage(stage_id, next.total_score, &next.stages);
    }

    let unlocked_level = newly_unlocked_levels(&progress.stages, &next.stages)
        .into_iter()
        .find(|id| progress.stage(stage_id).is_some_and(|s| s.contains_level(*id)));
    let unlocked_stage = newly_unlocked_stages(&progress.stages, &next.stages)
        .into_iter()
        .next();

    Some(LevelCompletion {
        progress: next,
        first_completion,
        unlocked_level,
        completed_stage,
        unlocked_stage,
    })
}

/// Re-evaluate stage unlocks against the current score.
///
/// Used after any score-increasing event that is not itself a level
/// completion, so a child who already finished a stage gets the next one as
/// soon as the threshold is reached.
pub fn recheck_stage_unlocks(progress: &ChildProgress) -> ChildProgress {
    let mut next = progress.clone();
    let stage_ids: Vec<StageId> = next.stages.iter().map(|s| s.id).collect();
    for stage_id in stage_ids {
        if is_stage_completed(stage_id, &next.completed_levels, &next.stages) {
            next.completed_stages.insert(stage_id);
            next.stages = unlock_next_stage(stage_id, next.total_score, &next.stages);
        }
    }
    next
}

/// Stage ids locked in `before` and unlocked in `after`
pub fn newly_unlocked_stages(before: &[Stage], after: &[Stage]) -> Vec<StageId> {
    after
        .iter()
        .filter(|s| !s.is_locked)
        .filter(|s| before.iter().any(|b| b.id == s.id && b.is_locked))
        .map(|s| s.id)
        .collect()
}

/// Level ids locked in `before` and unlocked in `after`
pub fn newly_unlocked_levels(before: &[Stage], after: &[Stage]) -> Vec<LevelId> {
    let was_locked: BTreeSet<LevelId> = before
        .iter()
        .flat_map(|s| s.levels.iter())
        .filter(|l| l.is_locked)
        .map(|l| l.id)
        .collect();
    after
        .iter()
        .flat_map(|s| s.levels.iter())
        .filter(|l| !l.is_locked && was_locked.contains(&l.id))
        .map(|l| l.id)
        .collect()
}

/// Index of the level a child should resume in a stage: the first unlocked
/// level not yet completed, otherwise 0 (replay from the start).
///
/// Resolve it against the catalog with
/// [`GameCatalog::level_at`](crate::catalog::GameCatalog::level_at), which
/// clamps indices that no longer fit the stage.
pub fn resume_index(progress: &ChildProgress, stage_id: StageId) -> Option<usize> {
    let stage = progress.stage(stage_id)?;
    let index = stage
        .levels
        .iter()
        .position(|l| !l.is_locked && !progress.is_level_completed(l.id))
        .unwrap_or(0);
    Some(index)
}
