//! Built-in achievement definitions
//!
//! Seeded into the local catalog. A remote catalog ships its own rows.

use crate::domain::{AchievementDefinition, GameKey, TriggerValue};

/// Static achievement row
#[derive(Debug, Clone)]
pub struct BuiltinAchievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub activity_type: &'static str,
    pub points: u32,
    pub trigger: Option<u32>,
    /// `None` for achievements shared by every game
    pub game_key: Option<&'static str>,
}

impl BuiltinAchievement {
    pub fn to_definition(&self) -> AchievementDefinition {
        AchievementDefinition {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
            activity_type: self.activity_type.to_string(),
            points: self.points,
            trigger_value: self.trigger.map(TriggerValue::from),
            game_key: self.game_key.map(GameKey::new),
        }
    }
}

pub static BUILTIN_ACHIEVEMENTS: &[BuiltinAchievement] = &[
    // === COUNTING GAME ===
    BuiltinAchievement {
        id: "counting_first_level",
        name: "Emu!",
        description: "Finish your first counting level",
        icon: "🔢",
        activity_type: "counting_level_complete",
        points: 10,
        trigger: Some(1),
        game_key: Some(GameKey::COUNTING),
    },
    BuiltinAchievement {
        id: "counting_to_five",
        name: "Counted to Five",
        description: "Finish the One to Five stage",
        icon: "✋",
        activity_type: "counting_stage_complete",
        points: 25,
        trigger: Some(1),
        game_key: Some(GameKey::COUNTING),
    },
    BuiltinAchievement {
        id: "counting_to_ten",
        name: "Kkumi!",
        description: "Finish the Six to Ten stage",
        icon: "🙌",
        activity_type: "counting_stage_complete",
        points: 50,
        trigger: Some(2),
        game_key: Some(GameKey::COUNTING),
    },
    BuiltinAchievement {
        id: "counting_perfect",
        name: "Perfect Counter",
        description: "Finish any counting level without a mistake",
        icon: "⭐",
        activity_type: "level_perfect_quiz",
        points: 20,
        trigger: None,
        game_key: Some(GameKey::COUNTING),
    },
    // === LUGANDA WORDS GAME ===
    BuiltinAchievement {
        id: "language_first_words",
        name: "First Words",
        description: "Finish your first Luganda level",
        icon: "🗣️",
        activity_type: "language_level_complete",
        points: 10,
        trigger: Some(1),
        game_key: Some(GameKey::LUGANDA_WORDS),
    },
    BuiltinAchievement {
        id: "language_polite_friend",
        name: "Polite Friend",
        description: "Learn to say yes, no and goodbye",
        icon: "👋",
        activity_type: "language_level_complete",
        points: 15,
        trigger: Some(2),
        game_key: Some(GameKey::LUGANDA_WORDS),
    },
    BuiltinAchievement {
        id: "language_greetings",
        name: "Greetings Master",
        description: "Finish the Greetings stage",
        icon: "🤝",
        activity_type: "language_stage_complete",
        points: 30,
        trigger: Some(1),
        game_key: Some(GameKey::LUGANDA_WORDS),
    },
    BuiltinAchievement {
        id: "language_family",
        name: "Family Tree",
        description: "Finish the Family stage",
        icon: "👪",
        activity_type: "language_stage_complete",
        points: 50,
        trigger: Some(2),
        game_key: Some(GameKey::LUGANDA_WORDS),
    },
    BuiltinAchievement {
        id: "language_perfect_greetings",
        name: "Webale Nnyo",
        description: "Answer every greeting correctly",
        icon: "🌟",
        activity_type: "language_level_perfect_quiz",
        points: 20,
        trigger: Some(1),
        game_key: Some(GameKey::LUGANDA_WORDS),
    },
    // === ANY GAME ===
    BuiltinAchievement {
        id: "words_10",
        name: "Word Collector",
        description: "Learn 10 words",
        icon: "📚",
        activity_type: "total_words_learned",
        points: 20,
        trigger: Some(10),
        game_key: None,
    },
    BuiltinAchievement {
        id: "words_25",
        name: "Word Keeper",
        description: "Learn 25 words",
        icon: "📖",
        activity_type: "total_words_learned",
        points: 40,
        trigger: Some(25),
        game_key: None,
    },
    BuiltinAchievement {
        id: "score_100",
        name: "Hundred Club",
        description: "Reach 100 points",
        icon: "💯",
        activity_type: "total_score_reach",
        points: 25,
        trigger: Some(100),
        game_key: None,
    },
    BuiltinAchievement {
        id: "score_500",
        name: "Star Learner",
        description: "Reach 500 points",
        icon: "🏆",
        activity_type: "total_score_reach",
        points: 75,
        trigger: Some(500),
        game_key: None,
    },
    BuiltinAchievement {
        id: "streak_3",
        name: "On Fire",
        description: "Play three days in a row",
        icon: "🔥",
        activity_type: "streak_days",
        points: 15,
        trigger: Some(3),
        game_key: None,
    },
    BuiltinAchievement {
        id: "streak_7",
        name: "Week of Learning",
        description: "Play seven days in a row",
        icon: "📅",
        activity_type: "streak_days",
        points: 35,
        trigger: Some(7),
        game_key: None,
    },
];

/// All built-in definitions as owned catalog entries
pub fn builtin_definitions() -> Vec<AchievementDefinition> {
    BUILTIN_ACHIEVEMENTS
        .iter()
        .map(BuiltinAchievement::to_definition)
        .collect()
}
