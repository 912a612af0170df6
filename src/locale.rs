//! User-facing strings for the languages the bot speaks.

use crate::models::PlacementKey;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    /// Parse `en` / `ru` (case-insensitive, region suffix ignored).
    pub fn parse(s: &str) -> Option<Self> {
        let lang = s.trim().to_ascii_lowercase();
        let lang = lang.split(['-', '_']).next().unwrap_or_default();
        match lang {
            "en" => Some(Locale::En),
            "ru" => Some(Locale::Ru),
            _ => None,
        }
    }

    pub fn default_player_name(self) -> &'static str {
        match self {
            Locale::En => "Player",
            Locale::Ru => "Игрок",
        }
    }

    pub fn default_tournament_name(self) -> &'static str {
        match self {
            Locale::En => "Tournament",
            Locale::Ru => "Турнир",
        }
    }

    pub fn placement_name(self, key: &PlacementKey) -> String {
        let name = match (self, key) {
            (Locale::En, PlacementKey::Third) => "3rd place match",
            (Locale::En, PlacementKey::FifthSixth) => "5th-6th place match",
            (Locale::En, PlacementKey::FifthEighth) => "5th-8th place",
            (Locale::En, PlacementKey::Seventh) => "7th-8th place match",
            (Locale::Ru, PlacementKey::Third) => "Матч за 3-е место",
            (Locale::Ru, PlacementKey::FifthSixth) => "Матч за 5-6 места",
            (Locale::Ru, PlacementKey::FifthEighth) => "Места 5-8",
            (Locale::Ru, PlacementKey::Seventh) => "Матч за 7-8 места",
            (Locale::En, PlacementKey::Other(tag)) => return format!("Placement {}", tag),
            (Locale::Ru, PlacementKey::Other(tag)) => return format!("Места {}", tag),
        };
        name.to_string()
    }

    pub fn first_round_heading(self) -> &'static str {
        match self {
            Locale::En => "First round:",
            Locale::Ru => "Первый круг:",
        }
    }

    pub fn versus(self) -> &'static str {
        match self {
            Locale::En => "vs",
            Locale::Ru => "против",
        }
    }

    pub fn bye(self) -> &'static str {
        match self {
            Locale::En => "bye",
            Locale::Ru => "проходит без игры",
        }
    }

    pub fn no_pairings(self) -> &'static str {
        match self {
            Locale::En => "No pairings yet",
            Locale::Ru => "Пар пока нет",
        }
    }

    pub fn no_photos(self) -> &'static str {
        match self {
            Locale::En => "No photos from games yet",
            Locale::Ru => "Фотографий с игр пока нет",
        }
    }

    pub fn updated_at(self) -> &'static str {
        match self {
            Locale::En => "Updated",
            Locale::Ru => "Обновлено",
        }
    }

    pub fn render_failed(self) -> &'static str {
        match self {
            Locale::En => "Could not draw the bracket",
            Locale::Ru => "Не удалось нарисовать сетку",
        }
    }

    pub fn round_robin_unsupported(self) -> &'static str {
        match self {
            Locale::En => "Round-robin tournaments are not drawn as a bracket",
            Locale::Ru => "Круговые турниры не рисуются сеткой",
        }
    }
}
