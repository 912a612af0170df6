//! A single bracket match and the slot it feeds into.

use crate::models::player::Player;
use serde::{Deserialize, Serialize};

/// Which side of a match a player occupies.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

/// One pairing within one round of one bracket.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// None means the slot is not decided yet (or padding in round 0).
    pub player1: Option<Player>,
    pub player2: Option<Player>,
    /// Always one of `player1`/`player2` once propagation has run.
    pub winner: Option<Player>,
    pub score: Option<String>,
    pub is_bye: bool,
    /// 0-based position within its round.
    pub match_number: usize,
    pub is_placement: bool,
}

impl Match {
    /// Empty (TBD vs TBD) match at `match_number`.
    pub fn placeholder(match_number: usize) -> Self {
        Self {
            match_number,
            ..Self::default()
        }
    }

    /// Round-0 pairing built from padded slots. A single present player is a bye and wins.
    pub fn pairing(match_number: usize, player1: Option<Player>, player2: Option<Player>) -> Self {
        let mut m = Self {
            player1,
            player2,
            match_number,
            ..Self::default()
        };
        if let Some(sole) = m.sole_player().cloned() {
            m.is_bye = true;
            m.winner = Some(sole);
        }
        m
    }

    pub fn slot(&self, side: Side) -> Option<&Player> {
        match side {
            Side::One => self.player1.as_ref(),
            Side::Two => self.player2.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, side: Side) -> &mut Option<Player> {
        match side {
            Side::One => &mut self.player1,
            Side::Two => &mut self.player2,
        }
    }

    /// The only populated slot, if exactly one is populated.
    pub fn sole_player(&self) -> Option<&Player> {
        match (&self.player1, &self.player2) {
            (Some(p), None) | (None, Some(p)) => Some(p),
            _ => None,
        }
    }

    pub fn has_both_players(&self) -> bool {
        self.player1.is_some() && self.player2.is_some()
    }

    pub fn has_score(&self) -> bool {
        self.score.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    /// Winner of this match as used for advancement: the sole player of a bye, else the
    /// recorded winner.
    pub fn advancing_player(&self) -> Option<&Player> {
        if self.is_bye {
            if let Some(sole) = self.sole_player() {
                return Some(sole);
            }
        }
        self.winner.as_ref()
    }

    /// The player that lost, when both sides and the winner are known.
    pub fn loser(&self) -> Option<&Player> {
        let winner = self.winner.as_ref()?;
        let (p1, p2) = (self.player1.as_ref()?, self.player2.as_ref()?);
        if winner.is(p1) {
            Some(p2)
        } else if winner.is(p2) {
            Some(p1)
        } else {
            None
        }
    }

    /// Side occupied by the player with `id`.
    pub fn side_of(&self, id: &str) -> Option<Side> {
        if self.player1.as_ref().is_some_and(|p| p.id == id) {
            Some(Side::One)
        } else if self.player2.as_ref().is_some_and(|p| p.id == id) {
            Some(Side::Two)
        } else {
            None
        }
    }

    /// Whether `player` is the recorded winner.
    pub fn is_winner(&self, player: &Player) -> bool {
        self.winner.as_ref().is_some_and(|w| w.is(player))
    }

    /// Enforce the winner invariant: byes resolve to their sole player and a winner that is
    /// not on either side is dropped. Returns true when anything changed.
    pub fn settle_winner(&mut self) -> bool {
        if self.is_bye {
            if let Some(sole) = self.sole_player().cloned() {
                if !self.is_winner(&sole) {
                    self.winner = Some(sole);
                    return true;
                }
                return false;
            }
        }
        let stale = match &self.winner {
            Some(w) => self.side_of(&w.id).is_none(),
            None => false,
        };
        if stale {
            self.winner = None;
        }
        stale
    }
}
