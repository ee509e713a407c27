use serde::{Deserialize, Serialize};

/// Identifies which game produced an event or owns a progress record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameKey(String);

impl GameKey {
    pub const COUNTING: &'static str = "counting_game";
    pub const LUGANDA_WORDS: &'static str = "luganda_learning_game";

    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn counting() -> Self {
        Self::new(Self::COUNTING)
    }

    pub fn luganda_words() -> Self {
        Self::new(Self::LUGANDA_WORDS)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GameKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
