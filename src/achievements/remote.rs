//! Remote achievement catalog over a PostgREST-style HTTP API
//!
//! Tables `achievements` and `child_achievements` are exposed as REST
//! resources. Requests are blocking (`ureq`) and run on the blocking pool so
//! they never stall the async caller.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use super::AchievementCatalog;
use crate::domain::{AchievementDefinition, ChildAchievement, GameKey};
use crate::error::{ProgressError, Result};

/// Remote catalog client
#[derive(Clone)]
pub struct RestAchievementCatalog {
    base_url: String,
    api_key: Option<String>,
    agent: ureq::Agent,
}

#[derive(Serialize)]
struct NewAward<'a> {
    child_id: &'a str,
    achievement_id: &'a str,
}

impl RestAchievementCatalog {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout(timeout)
            .build();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn with_auth(&self, mut req: ureq::Request) -> ureq::Request {
        if let Some(key) = &self.api_key {
            req = req
                .set("apikey", key)
                .set("Authorization", &format!("Bearer {key}"));
        }
        req.set("Accept", "application/json")
    }

    fn resource(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    fn get(&self, table: &str, query: &[(&str, String)]) -> ureq::Request {
        let mut req = self.with_auth(self.agent.get(&self.resource(table)));
        for (key, value) in query {
            req = req.query(key, value);
        }
        req
    }
}

/// Query parameters selecting a game's definitions plus the generic ones
pub(crate) fn definitions_query(game_key: Option<&GameKey>) -> Vec<(&'static str, String)> {
    let mut query = vec![("select", "*".to_string())];
    if let Some(key) = game_key {
        query.push(("or", format!("(game_key.eq.{},game_key.is.null)", key)));
    }
    query
}

pub(crate) fn earned_query(child_id: &str) -> Vec<(&'static str, String)> {
    vec![
        ("select", "*".to_string()),
        ("child_id", format!("eq.{}", child_id)),
    ]
}

pub(crate) fn map_ureq_error(err: ureq::Error) -> ProgressError {
    match err {
        ureq::Error::Status(status, resp) => ProgressError::Http {
            status,
            body: resp.into_string().unwrap_or_default().trim().to_string(),
        },
        ureq::Error::Transport(t) => ProgressError::Transport(t.to_string()),
    }
}

/// Rows of a response body: an array, a single object, or nothing
fn read_rows(resp: ureq::Response) -> Result<Vec<Value>> {
    let body = resp.into_string()?;
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(match serde_json::from_str(&body)? {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        row => vec![row],
    })
}

/// Decode rows one at a time, dropping the ones that don't fit `T`
pub(crate) fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping malformed {} row: {}", table, e);
                None
            }
        })
        .collect()
}

fn call_rows(req: ureq::Request) -> Result<Vec<Value>> {
    let resp = req.call().map_err(map_ureq_error)?;
    read_rows(resp)
}

#[async_trait]
impl AchievementCatalog for RestAchievementCatalog {
    async fn fetch_achievement_definitions(
        &self,
        game_key: Option<&GameKey>,
    ) -> Result<Vec<AchievementDefinition>> {
        let req = self.get("achievements", &definitions_query(game_key));
        let rows = tokio::task::spawn_blocking(move || call_rows(req)).await??;
        Ok(decode_rows("achievements", rows))
    }

    async fn fetch_earned_achievements(&self, child_id: &str) -> Result<Vec<ChildAchievement>> {
        let req = self.get("child_achievements", &earned_query(child_id));
        let rows = tokio::task::spawn_blocking(move || call_rows(req)).await??;
        Ok(decode_rows("child_achievements", rows))
    }

    async fn insert_earned_achievement(
        &self,
        child_id: &str,
        achievement_id: &str,
    ) -> Result<ChildAchievement> {
        let req = self
            .with_auth(self.agent.post(&self.resource("child_achievements")))
            .set("Content-Type", "application/json")
            .set("Prefer", "return=representation");
        let body = serde_json::to_value(NewAward {
            child_id,
            achievement_id,
        })?;

        let result = tokio::task::spawn_blocking(move || -> Result<Vec<Value>> {
            let resp = req.send_json(body).map_err(map_ureq_error)?;
            read_rows(resp)
        })
        .await?;

        match result {
            Ok(rows) => {
                let inserted = decode_rows::<ChildAchievement>("child_achievements", rows);
                match inserted.into_iter().next() {
                    Some(record) => Ok(record),
                    None => {
                        // The row exists server-side; only its representation is missing.
                        warn!(
                            "Insert of {} for {} returned no usable row",
                            achievement_id, child_id
                        );
                        Ok(ChildAchievement {
                            id: Uuid::new_v4().to_string(),
                            child_id: child_id.to_string(),
                            achievement_id: achievement_id.to_string(),
                            earned_at: Utc::now(),
                        })
                    }
                }
            }
            // Unique violation on (child_id, achievement_id)
            Err(ProgressError::Http { status: 409, .. }) => Err(ProgressError::DuplicateAward {
                child_id: child_id.to_string(),
                achievement_id: achievement_id.to_string(),
            }),
            Err(e) => Err(e),
        }
    }
}
