//! Achievements command implementation

use anyhow::Result;

use essomero::config::Config;

use super::resolve_game;

/// List a game's achievements, marking the ones the child has earned
pub async fn achievements_command(config: &Config, child: &str, game: &str) -> Result<()> {
    let catalog = resolve_game(game)?;
    let engine = config.open_achievement_engine()?;

    let definitions = engine
        .catalog()
        .fetch_achievement_definitions(Some(&catalog.game_key))
        .await?;
    let earned = engine.earned_ids(child).await;

    if definitions.is_empty() {
        println!("No achievements defined for {}.", catalog.game_key);
        return Ok(());
    }

    let earned_count = definitions.iter().filter(|d| earned.contains(&d.id)).count();
    println!(
        "Achievements for {} in {} ({}/{}):\n",
        child,
        catalog.game_key,
        earned_count,
        definitions.len()
    );

    for def in &definitions {
        let marker = if earned.contains(&def.id) { "x" } else { " " };
        println!(
            "  [{}] {} {} (+{}) - {}",
            marker, def.icon, def.name, def.points, def.description
        );
    }

    Ok(())
}
