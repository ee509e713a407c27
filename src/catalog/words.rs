//! Luganda words game

use once_cell::sync::Lazy;

use super::{GameCatalog, LevelTemplate, StageTemplate};
use crate::domain::GameKey;

pub static LUGANDA_WORDS_GAME: Lazy<GameCatalog> = Lazy::new(|| GameCatalog {
    game_key: GameKey::luganda_words(),
    title: "Ebigambo".to_string(),
    storage_prefix: "luganda_progress".to_string(),
    stats_field: "luganda_user_stats".to_string(),
    stages: vec![
        StageTemplate {
            id: 1,
            name: "Greetings".to_string(),
            required_score: 0,
            levels: vec![
                LevelTemplate::new(
                    1,
                    &[("Oli otya", "How are you"), ("Bulungi", "Fine"), ("Webale", "Thank you")],
                ),
                LevelTemplate::new(2, &[("Weraba", "Goodbye"), ("Yee", "Yes"), ("Nedda", "No")]),
            ],
        },
        StageTemplate {
            id: 2,
            name: "Family".to_string(),
            required_score: 100,
            levels: vec![
                LevelTemplate::new(
                    3,
                    &[("Maama", "Mother"), ("Taata", "Father"), ("Omwana", "Child")],
                ),
                LevelTemplate::new(
                    4,
                    &[("Jjajja", "Grandparent"), ("Ssenga", "Aunt"), ("Kojja", "Uncle")],
                ),
            ],
        },
        StageTemplate {
            id: 3,
            name: "Animals".to_string(),
            required_score: 250,
            levels: vec![
                LevelTemplate::new(5, &[("Embwa", "Dog"), ("Kkapa", "Cat"), ("Ente", "Cow")]),
                LevelTemplate::new(
                    6,
                    &[("Enkoko", "Chicken"), ("Embuzi", "Goat"), ("Empologoma", "Lion")],
                ),
            ],
        },
        StageTemplate {
            id: 4,
            name: "Nature".to_string(),
            required_score: 450,
            levels: vec![LevelTemplate::new(
                7,
                &[("Amazzi", "Water"), ("Omuti", "Tree"), ("Enjuba", "Sun"), ("Omwezi", "Moon")],
            )],
        },
    ],
});
