//! Achievement definitions and earned-award records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::game::GameKey;

/// The condition family an achievement is triggered by.
///
/// Catalog entries may prefix the tag with a game name
/// (`language_level_complete`, `counting_stage_complete`); only the suffix
/// decides the trigger kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    LevelComplete,
    StageComplete,
    TotalWordsLearned,
    TotalScoreReach,
    StreakDays,
    LevelPerfectQuiz,
}

impl TriggerKind {
    const ALL: [TriggerKind; 6] = [
        Self::LevelPerfectQuiz,
        Self::LevelComplete,
        Self::StageComplete,
        Self::TotalWordsLearned,
        Self::TotalScoreReach,
        Self::StreakDays,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LevelComplete => "level_complete",
            Self::StageComplete => "stage_complete",
            Self::TotalWordsLearned => "total_words_learned",
            Self::TotalScoreReach => "total_score_reach",
            Self::StreakDays => "streak_days",
            Self::LevelPerfectQuiz => "level_perfect_quiz",
        }
    }

    /// Parse an activity type tag, with or without a game prefix
    pub fn parse(activity_type: &str) -> Option<Self> {
        let tag = activity_type.trim();
        Self::ALL.into_iter().find(|kind| {
            let name = kind.as_str();
            tag == name
                || tag
                    .strip_suffix(name)
                    .is_some_and(|prefix| prefix.ends_with('_'))
        })
    }
}

/// Threshold or target id attached to a definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TriggerValue {
    Number(f64),
    Text(String),
}

impl TriggerValue {
    /// Numeric reading of the value; text is parsed, unparseable text is `None`
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Number(_) => None,
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    pub fn matches_id(&self, id: u32) -> bool {
        self.as_number() == Some(id as f64)
    }
}

impl From<u32> for TriggerValue {
    fn from(n: u32) -> Self {
        Self::Number(n as f64)
    }
}

/// Catalog entry describing one achievement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDefinition {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub icon: String,
    pub activity_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub points: u32,
    #[serde(default)]
    pub trigger_value: Option<TriggerValue>,
    /// `None` means the achievement applies to every game
    #[serde(default)]
    pub game_key: Option<GameKey>,
}

impl AchievementDefinition {
    pub fn trigger_kind(&self) -> Option<TriggerKind> {
        TriggerKind::parse(&self.activity_type)
    }

    pub fn applies_to(&self, game_key: &GameKey) -> bool {
        self.game_key.as_ref().is_none_or(|key| key == game_key)
    }
}

/// A child's earned achievement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildAchievement {
    /// Row id; remote tables may hand out integer keys
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub child_id: String,
    pub achievement_id: String,
    pub earned_at: DateTime<Utc>,
}

/// Remote rows send `null` for unset columns
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}
