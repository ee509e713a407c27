//! Core domain types for essomero

mod achievement;
mod event;
mod game;
mod progress;

pub use achievement::{AchievementDefinition, ChildAchievement, TriggerKind, TriggerValue};
pub use event::{GameEvent, GameEventKind};
pub use game::GameKey;
pub use progress::{ChildProgress, Level, LevelId, Stage, StageId, UserStats};
