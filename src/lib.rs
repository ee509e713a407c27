//! Essomero - learning progress for Luganda kids' games
//!
//! Tracks a child's progress through staged game content, decides what
//! unlocks next, and awards achievements for learning milestones.
//!
//! ## Layers
//!
//! 1. **Unlock engine** ([`unlock`]): pure transforms over stage layouts.
//!    A stage opens only when the previous one is fully completed *and* the
//!    score reaches its threshold.
//!
//! 2. **Persistence** ([`progress`], [`achievements`]): one progress record per
//!    `(game, child)` in a key-value store, and an achievement catalog (local
//!    SQLite or a remote REST API) that records each award at most once.
//!
//! 3. **Session** ([`session`]): runs a level completion end to end, from the
//!    unlock computation to the final persisted score.

pub mod achievements;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod progress;
pub mod session;
pub mod unlock;

pub use domain::*;
pub use error::ProgressError;
