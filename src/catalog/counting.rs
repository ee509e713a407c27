//! Counting game: Luganda numbers

use once_cell::sync::Lazy;

use super::{GameCatalog, LevelTemplate, StageTemplate};
use crate::domain::GameKey;

pub static COUNTING_GAME: Lazy<GameCatalog> = Lazy::new(|| GameCatalog {
    game_key: GameKey::counting(),
    title: "Okubala".to_string(),
    storage_prefix: "counting_progress".to_string(),
    stats_field: "counting_user_stats".to_string(),
    stages: vec![
        StageTemplate {
            id: 1,
            name: "One to Five".to_string(),
            required_score: 0,
            levels: vec![
                LevelTemplate::new(1, &[("emu", "one"), ("bbiri", "two"), ("ssatu", "three")]),
                LevelTemplate::new(2, &[("nnya", "four"), ("ttaano", "five")]),
            ],
        },
        StageTemplate {
            id: 2,
            name: "Six to Ten".to_string(),
            required_score: 100,
            levels: vec![
                LevelTemplate::new(
                    3,
                    &[("mukaaga", "six"), ("musanvu", "seven"), ("munaana", "eight")],
                ),
                LevelTemplate::new(4, &[("mwenda", "nine"), ("kkumi", "ten")]),
            ],
        },
        StageTemplate {
            id: 3,
            name: "Counting by Tens".to_string(),
            required_score: 250,
            levels: vec![LevelTemplate::new(
                5,
                &[
                    ("amakumi abiri", "twenty"),
                    ("amakumi asatu", "thirty"),
                    ("amakumi ana", "forty"),
                    ("amakumi ataano", "fifty"),
                    ("kikumi", "one hundred"),
                ],
            )],
        },
    ],
});
