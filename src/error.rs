//! Error type for the progress core
//!
//! Everything below the CLI returns [`Result`]. Callers that must never block
//! gameplay go through the logged-fallback wrappers (`ProgressStore::load`,
//! `ProgressStore::save`, `AchievementEngine::check_and_grant_new_achievements`)
//! instead of swallowing errors themselves.

/// Errors produced by storage, catalog and event construction
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Achievement {achievement_id} already earned by {child_id}")]
    DuplicateAward {
        child_id: String,
        achievement_id: String,
    },

    #[error("Invalid game event: {0}")]
    InvalidEvent(String),

    #[error("Background task failed: {0}")]
    TaskJoin(String),
}

impl ProgressError {
    /// True when the error is a uniqueness violation on an award
    pub fn is_duplicate_award(&self) -> bool {
        match self {
            Self::DuplicateAward { .. } => true,
            Self::Storage(rusqlite::Error::SqliteFailure(err, _)) => {
                err.code == rusqlite::ErrorCode::ConstraintViolation
            }
            _ => false,
        }
    }
}

impl From<tokio::task::JoinError> for ProgressError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoin(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProgressError>;
