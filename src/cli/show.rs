//! Show command implementation

use anyhow::Result;

use essomero::config::Config;
use essomero::unlock::resume_index;

use super::resolve_game;

/// Print a child's progress through one game
pub async fn show_command(config: &Config, child: &str, game: &str) -> Result<()> {
    let catalog = resolve_game(game)?;
    let store = config.open_progress_store(catalog)?;
    let progress = store.load(child);
    let stats = &progress.user_stats;

    println!("{} ({}) - {}\n", catalog.title, catalog.game_key, child);
    println!(
        "  Score: {}   Levels: {}/{} ({:.0}%)",
        progress.total_score,
        progress.completed_levels.len(),
        progress.stages.iter().map(|s| s.levels.len()).sum::<usize>(),
        progress.completion_ratio() * 100.0
    );
    println!(
        "  Words: {}   Accuracy: {:.0}%   Streak: {} day(s)\n",
        stats.total_words,
        stats.accuracy() * 100.0,
        stats.streak_days
    );

    for stage in &progress.stages {
        let marker = if progress.completed_stages.contains(&stage.id) {
            "done"
        } else if stage.is_locked {
            "locked"
        } else {
            "open"
        };
        println!(
            "  Stage {} [{}] {} (needs {} points)",
            stage.id, marker, stage.name, stage.required_score
        );

        for level in &stage.levels {
            let marker = if progress.is_level_completed(level.id) {
                "x"
            } else if level.is_locked {
                "-"
            } else {
                " "
            };
            println!("    [{}] Level {} ({} words)", marker, level.id, level.word_count);
        }

        if !stage.is_locked {
            let next = resume_index(&progress, stage.id)
                .and_then(|index| catalog.level_at(stage.id, index));
            if let Some(level) = next {
                let words: Vec<&str> = level.items.iter().map(|i| i.luganda.as_str()).collect();
                println!("    Next: level {} ({})", level.id, words.join(", "));
            }
        }
    }

    Ok(())
}
