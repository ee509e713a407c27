//! CLI command implementations

pub mod achievements;
pub mod complete;
pub mod init;
pub mod reset;
pub mod show;

use anyhow::{Result, anyhow};

use essomero::catalog::GameCatalog;
use essomero::domain::GameKey;

/// Resolve `--game` to a built-in catalog
pub fn resolve_game(key: &str) -> Result<&'static GameCatalog> {
    GameCatalog::by_key(&GameKey::from(key)).ok_or_else(|| {
        let known: Vec<&str> = GameCatalog::builtins()
            .iter()
            .map(|c| c.game_key.as_str())
            .collect();
        anyhow!("Unknown game: {} (known: {})", key, known.join(", "))
    })
}
