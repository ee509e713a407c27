use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use essomero::config::Config;
use essomero::domain::GameKey;

mod cli;

#[derive(Parser)]
#[command(name = "essomero")]
#[command(about = "Progress, unlocks and achievements for Luganda learning games")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.essomero/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new ~/.essomero/config.toml configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show a child's progress in a game
    Show {
        #[arg(long)]
        child: String,

        #[arg(long, default_value = GameKey::LUGANDA_WORDS)]
        game: String,
    },

    /// Record a finished level and award achievements
    Complete {
        #[arg(long)]
        child: String,

        #[arg(long, default_value = GameKey::LUGANDA_WORDS)]
        game: String,

        #[arg(long)]
        stage: u32,

        #[arg(long)]
        level: u32,

        /// Points scored in the level
        #[arg(long)]
        score: u32,

        /// Highest possible score of the level
        #[arg(long)]
        max_score: u32,

        #[arg(long, default_value_t = 0)]
        correct: u32,

        #[arg(long, default_value_t = 0)]
        wrong: u32,

        /// Words learned (defaults to the level's word count on first completion)
        #[arg(long)]
        words: Option<u32>,
    },

    /// List achievements and which ones a child has earned
    Achievements {
        #[arg(long)]
        child: String,

        #[arg(long, default_value = GameKey::LUGANDA_WORDS)]
        game: String,
    },

    /// Delete a child's progress in a game
    Reset {
        #[arg(long)]
        child: String,

        #[arg(long, default_value = GameKey::LUGANDA_WORDS)]
        game: String,

        /// Also delete earned achievements (local backend only)
        #[arg(long)]
        achievements: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    if let Commands::Init { force } = cli.command {
        return cli::init::init_command(cli.config, force).await;
    }

    let config = Config::load_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Init { .. } => {}
        Commands::Show { child, game } => {
            cli::show::show_command(&config, &child, &game).await?;
        }
        Commands::Complete {
            child,
            game,
            stage,
            level,
            score,
            max_score,
            correct,
            wrong,
            words,
        } => {
            let args = cli::complete::CompleteArgs {
                child,
                game,
                stage,
                level,
                score,
                max_score,
                correct,
                wrong,
                words,
            };
            cli::complete::complete_command(&config, args).await?;
        }
        Commands::Achievements { child, game } => {
            cli::achievements::achievements_command(&config, &child, &game).await?;
        }
        Commands::Reset {
            child,
            game,
            achievements,
        } => {
            cli::reset::reset_command(&config, &child, &game, achievements).await?;
        }
    }

    Ok(())
}
