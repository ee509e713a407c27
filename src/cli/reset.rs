//! Reset command implementation

use anyhow::{bail, Result};

use essomero::config::{AchievementBackend, Config};

use super::resolve_game;

/// Delete a child's progress for one game, optionally with local awards
pub async fn reset_command(
    config: &Config,
    child: &str,
    game: &str,
    with_achievements: bool,
) -> Result<()> {
    let catalog = resolve_game(game)?;
    let store = config.open_progress_store(catalog)?;

    if !store.reset(child) {
        bail!("Failed to reset {} progress for {}", catalog.game_key, child);
    }
    println!("Reset {} progress for {}", catalog.game_key, child);

    if with_achievements {
        match config.achievements.backend {
            AchievementBackend::Local => {
                let removed = config.open_local_achievements()?.reset_child(child)?;
                println!("Removed {} earned achievement(s)", removed);
            }
            AchievementBackend::Remote => {
                eprintln!("Earned achievements live in the remote catalog; left unchanged");
            }
        }
    }

    Ok(())
}
