//! Complete command implementation

use anyhow::{bail, Result};

use essomero::config::Config;
use essomero::domain::{LevelId, StageId};
use essomero::session::{GameSession, LevelOutcome};

use super::resolve_game;

/// Arguments of `essomero complete`
#[derive(Debug, Clone)]
pub struct CompleteArgs {
    pub child: String,
    pub game: String,
    pub stage: StageId,
    pub level: LevelId,
    pub score: u32,
    pub max_score: u32,
    pub correct: u32,
    pub wrong: u32,
    pub words: Option<u32>,
}

/// Run the full level completion flow and print what changed
pub async fn complete_command(config: &Config, args: CompleteArgs) -> Result<()> {
    let catalog = resolve_game(&args.game)?;
    let store = config.open_progress_store(catalog)?;
    let engine = config.open_achievement_engine()?;

    let mut outcome =
        LevelOutcome::new(args.score, args.max_score).with_answers(args.correct, args.wrong);
    if let Some(words) = args.words {
        outcome = outcome.with_words(words);
    }

    let mut session = GameSession::start(store, engine, args.child.as_str()).await;
    let Some(report) = session.complete_level(args.stage, args.level, outcome).await else {
        bail!(
            "Level {} of stage {} is locked or does not exist in {}",
            args.level,
            args.stage,
            catalog.game_key
        );
    };

    if report.first_completion {
        println!("Level {} complete!", args.level);
    } else {
        println!("Level {} replayed.", args.level);
    }
    if let Some(level) = report.unlocked_level {
        println!("  Unlocked level {}", level);
    }
    if let Some(stage) = report.completed_stage {
        println!("  Finished stage {}", stage);
    }
    for stage in &report.unlocked_stages {
        println!("  Unlocked stage {}", stage);
    }

    for achievement in &report.new_achievements {
        println!(
            "  {} {} (+{}) - {}",
            achievement.icon, achievement.name, achievement.points, achievement.description
        );
    }

    println!(
        "\nScore: {} ({} + {} from achievements)",
        report.progress.total_score, report.base_score, report.achievement_points
    );
    if !report.persisted {
        eprintln!("Warning: progress could not be saved");
    }

    Ok(())
}
