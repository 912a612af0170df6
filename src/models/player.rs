//! Player data structure.

use serde::{Deserialize, Serialize};

/// Identifier of a participant, always a string (numeric ids are coerced at the boundary).
pub type PlayerId = String;

/// A tournament participant as shown in a bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Avatar location (absolute path, or relative to the avatar directory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Overrides the initials drawn on a placeholder avatar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
}

impl Player {
    /// Create a player without photo or initial override.
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            photo_url: None,
            initial: None,
        }
    }

    pub fn with_photo(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }

    pub fn with_initial(mut self, initial: impl Into<String>) -> Self {
        self.initial = Some(initial.into());
        self
    }

    /// Same participant as `other` (by id).
    pub fn is(&self, other: &Player) -> bool {
        self.id == other.id
    }

    /// Copy of this player that keeps `existing`'s photo when this one has none.
    ///
    /// Used when a winner is written into a slot that already holds the same participant.
    pub fn merged_with(&self, existing: &Player) -> Player {
        let mut merged = self.clone();
        if self.is(existing) {
            if merged.photo_url.is_none() {
                merged.photo_url = existing.photo_url.clone();
            }
            if merged.initial.is_none() {
                merged.initial = existing.initial.clone();
            }
        }
        merged
    }
}
