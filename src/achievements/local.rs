//! SQLite achievement catalog
//!
//! Local stand-in for the remote catalog: definitions live in
//! `achievement_definitions`, awards in `child_achievements` with a UNIQUE
//! `(child_id, achievement_id)` constraint.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row};

use super::definitions::builtin_definitions;
use super::AchievementCatalog;
use crate::domain::{AchievementDefinition, ChildAchievement, GameKey, TriggerValue};
use crate::error::{ProgressError, Result};

#[derive(Clone)]
pub struct SqliteAchievementCatalog {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAchievementCatalog {
    /// Open or create the catalog database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Self::init(conn)
    }

    /// Empty in-memory catalog
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert built-in definitions that are not present yet. Rows edited in
    /// the database are left alone.
    pub fn seed_builtin_definitions(&self) -> Result<usize> {
        let mut inserted = 0;
        for def in builtin_definitions() {
            inserted += self.write_definition(&def, "INSERT OR IGNORE")?;
        }
        Ok(inserted)
    }

    /// Insert or replace one definition
    pub fn upsert_definition(&self, def: &AchievementDefinition) -> Result<()> {
        self.write_definition(def, "INSERT OR REPLACE")?;
        Ok(())
    }

    fn write_definition(&self, def: &AchievementDefinition, verb: &str) -> Result<usize> {
        let trigger = def
            .trigger_value
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let sql = format!(
            "{verb} INTO achievement_definitions
             (id, name, description, icon, activity_type, points, trigger_value, game_key)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
        );
        let changed = self.conn().execute(
            &sql,
            rusqlite::params![
                def.id,
                def.name,
                def.description,
                def.icon,
                def.activity_type,
                def.points,
                trigger,
                def.game_key.as_ref().map(GameKey::as_str),
            ],
        )?;
        Ok(changed)
    }

    fn load_definitions(&self, game_key: Option<&GameKey>) -> Result<Vec<AchievementDefinition>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            r#"SELECT id, name, description, icon, activity_type, points, trigger_value, game_key
               FROM achievement_definitions
               WHERE ?1 IS NULL OR game_key IS NULL OR game_key = ?1
               ORDER BY rowid"#,
        )?;
        let defs = stmt
            .query_map([game_key.map(GameKey::as_str)], definition_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(defs)
    }

    fn load_earned(&self, child_id: &str) -> Result<Vec<ChildAchievement>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            r#"SELECT id, child_id, achievement_id, earned_at
               FROM child_achievements WHERE child_id = ?1
               ORDER BY earned_at, rowid"#,
        )?;
        let earned = stmt
            .query_map([child_id], |row| {
                Ok(ChildAchievement {
                    id: row.get(0)?,
                    child_id: row.get(1)?,
                    achievement_id: row.get(2)?,
                    earned_at: millis_to_utc(row.get(3)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(earned)
    }

    fn insert_earned(&self, child_id: &str, achievement_id: &str) -> Result<ChildAchievement> {
        let record = ChildAchievement {
            id: uuid::Uuid::new_v4().to_string(),
            child_id: child_id.to_string(),
            achievement_id: achievement_id.to_string(),
            earned_at: Utc::now(),
        };
        let result = self.conn().execute(
            "INSERT INTO child_achievements (id, child_id, achievement_id, earned_at)
             VALUES (?1, ?2, ?3, ?4)",
            (
                &record.id,
                &record.child_id,
                &record.achievement_id,
                record.earned_at.timestamp_millis(),
            ),
        );
        match result {
            Ok(_) => Ok(record),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(ProgressError::DuplicateAward {
                    child_id: child_id.to_string(),
                    achievement_id: achievement_id.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every award of one child
    pub fn reset_child(&self, child_id: &str) -> Result<usize> {
        let removed = self
            .conn()
            .execute("DELETE FROM child_achievements WHERE child_id = ?1", [child_id])?;
        Ok(removed)
    }
}

fn definition_from_row(row: &Row<'_>) -> rusqlite::Result<AchievementDefinition> {
    let trigger: Option<String> = row.get(6)?;
    let game_key: Option<String> = row.get(7)?;
    Ok(AchievementDefinition {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        icon: row.get(3)?,
        activity_type: row.get(4)?,
        points: row.get(5)?,
        trigger_value: trigger.map(|raw| parse_trigger(&raw)),
        game_key: game_key.map(GameKey::new),
    })
}

/// Stored triggers are JSON; anything else is kept as plain text
fn parse_trigger(raw: &str) -> TriggerValue {
    serde_json::from_str(raw).unwrap_or_else(|_| TriggerValue::Text(raw.to_string()))
}

fn millis_to_utc(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

#[async_trait]
impl AchievementCatalog for SqliteAchievementCatalog {
    async fn fetch_achievement_definitions(
        &self,
        game_key: Option<&GameKey>,
    ) -> Result<Vec<AchievementDefinition>> {
        self.load_definitions(game_key)
    }

    async fn fetch_earned_achievements(&self, child_id: &str) -> Result<Vec<ChildAchievement>> {
        self.load_earned(child_id)
    }

    async fn insert_earned_achievement(
        &self,
        child_id: &str,
        achievement_id: &str,
    ) -> Result<ChildAchievement> {
        self.insert_earned(child_id, achievement_id)
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS achievement_definitions (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    icon TEXT NOT NULL DEFAULT '',
    activity_type TEXT NOT NULL,
    points INTEGER NOT NULL DEFAULT 0,
    trigger_value TEXT,
    game_key TEXT
);

CREATE TABLE IF NOT EXISTS child_achievements (
    id TEXT PRIMARY KEY,
    child_id TEXT NOT NULL,
    achievement_id TEXT NOT NULL,
    earned_at INTEGER NOT NULL,
    UNIQUE (child_id, achievement_id)
);
CREATE INDEX IF NOT EXISTS idx_child_achievements_child ON child_achievements(child_id);
"#;
