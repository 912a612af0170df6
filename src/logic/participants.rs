//! Participant normalization: every accepted participant shape becomes a `Player`.

use crate::locale::Locale;
use crate::models::{id_from_value, Player, PlayerId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Capability set the normalizer needs from a participant entry.
pub trait ParticipantSource {
    /// None when the entry carries no usable id.
    fn id(&self) -> Option<PlayerId>;
    fn name(&self) -> Option<String>;
    fn photo_url(&self) -> Option<String>;
    fn initial(&self) -> Option<String>;
}

/// Typed participant entry of the fallback list.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantRecord {
    pub id: PlayerId,
    pub name: Option<String>,
    pub photo_url: Option<String>,
    pub initial: Option<String>,
}

impl ParticipantSource for ParticipantRecord {
    fn id(&self) -> Option<PlayerId> {
        let id = self.id.trim();
        (!id.is_empty()).then(|| id.to_string())
    }
    fn name(&self) -> Option<String> {
        self.name.clone()
    }
    fn photo_url(&self) -> Option<String> {
        self.photo_url.clone()
    }
    fn initial(&self) -> Option<String> {
        self.initial.clone()
    }
}

impl ParticipantSource for Player {
    fn id(&self) -> Option<PlayerId> {
        (!self.id.is_empty()).then(|| self.id.clone())
    }
    fn name(&self) -> Option<String> {
        Some(self.name.clone())
    }
    fn photo_url(&self) -> Option<String> {
        self.photo_url.clone()
    }
    fn initial(&self) -> Option<String> {
        self.initial.clone()
    }
}

fn text_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match map.get(*k) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

/// Free-form key/value participant records as stored by the bot.
impl ParticipantSource for Map<String, Value> {
    fn id(&self) -> Option<PlayerId> {
        ["id", "user_id"].iter().find_map(|k| self.get(*k).and_then(id_from_value))
    }
    fn name(&self) -> Option<String> {
        text_field(self, &["name", "full_name"])
    }
    fn photo_url(&self) -> Option<String> {
        text_field(self, &["photo_url", "photo_path"])
    }
    fn initial(&self) -> Option<String> {
        text_field(self, &["initial"])
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Convert one entry; None when it has no id.
pub fn normalize_participant(entry: &impl ParticipantSource, locale: Locale) -> Option<Player> {
    let id = entry.id()?;
    Some(Player {
        id,
        name: present(entry.name()).unwrap_or_else(|| locale.default_player_name().to_string()),
        photo_url: present(entry.photo_url()),
        initial: present(entry.initial()),
    })
}

/// Convert a participant list, preserving order. Entries without an id are skipped.
pub fn normalize_participants<P: ParticipantSource>(entries: &[P], locale: Locale) -> Vec<Player> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let player = normalize_participant(entry, locale);
            if player.is_none() {
                log::warn!("Skipping participant #{} without an id", i);
            }
            player
        })
        .collect()
}
