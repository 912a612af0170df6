//! TournamentBracket, placement keys and reconstruction errors.

use crate::models::game::Match;
use crate::models::player::Player;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur while reconstructing a bracket from a tournament-state document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketError {
    /// A match record carries a negative round or match number.
    NegativeIndex { round: i64, match_number: i64 },
    /// A match number is beyond what the round can hold.
    MatchNumberOutOfRange { round: usize, match_number: usize, capacity: usize },
    /// The bracket would need more rounds than supported.
    TooManyRounds(usize),
}

impl std::fmt::Display for BracketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketError::NegativeIndex { round, match_number } => {
                write!(f, "Negative index in match record (round {}, match {})", round, match_number)
            }
            BracketError::MatchNumberOutOfRange { round, match_number, capacity } => write!(
                f,
                "Match number {} does not fit round {} (capacity {})",
                match_number, round, capacity
            ),
            BracketError::TooManyRounds(n) => write!(f, "Bracket needs too many rounds ({})", n),
        }
    }
}

impl std::error::Error for BracketError {}

/// Kind of tournament. Only single elimination is drawn as a bracket.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TournamentType {
    #[default]
    SingleElimination,
    RoundRobin,
}

impl<'de> Deserialize<'de> for TournamentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "round-robin" => TournamentType::RoundRobin,
            _ => TournamentType::SingleElimination,
        })
    }
}

/// Which placement mini-draw a sub-bracket decides.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PlacementKey {
    /// "3rd": third-place match.
    Third,
    /// "5-6": the merged group of "5-8" and "5th" records.
    FifthSixth,
    /// Derived 4-player draw of quarterfinal losers.
    FifthEighth,
    /// "7th": seventh-place match.
    Seventh,
    Other(String),
}

impl PlacementKey {
    /// Normalize a placement tag. "5-8" and "5th" collapse into one group; "3rd" and "7th"
    /// stay distinct.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        if tag.is_empty() {
            return None;
        }
        Some(match tag {
            "3rd" => PlacementKey::Third,
            "5-8" | "5th" | "5-6" => PlacementKey::FifthSixth,
            "7th" => PlacementKey::Seventh,
            other => PlacementKey::Other(other.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            PlacementKey::Third => "3rd",
            PlacementKey::FifthSixth => "5-6",
            PlacementKey::FifthEighth => "5-8",
            PlacementKey::Seventh => "7th",
            PlacementKey::Other(tag) => tag,
        }
    }

    /// Four-player mini-draws get extra spacing below them on the canvas.
    pub fn is_four_player_draw(&self) -> bool {
        matches!(self, PlacementKey::FifthSixth | PlacementKey::FifthEighth)
    }
}

impl Serialize for PlacementKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A named single-elimination tree of rounds with optional placement sub-brackets.
///
/// Built fresh for every render and never persisted.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TournamentBracket {
    pub name: String,
    pub tournament_type: TournamentType,
    /// Everyone involved, in first-seen order.
    pub players: Vec<Player>,
    /// `rounds[0]` is the first round, the last entry is the final.
    pub rounds: Vec<Vec<Match>>,
    pub additional_tournaments: Vec<TournamentBracket>,
    /// None for the main draw.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<PlacementKey>,
}

impl TournamentBracket {
    /// Bracket over `rounds`; `players` is collected from the slots.
    pub fn from_rounds(name: impl Into<String>, rounds: Vec<Vec<Match>>) -> Self {
        let mut bracket = Self {
            name: name.into(),
            rounds,
            ..Self::default()
        };
        bracket.collect_players();
        bracket
    }

    /// Flattened view over every match, round by round.
    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.rounds.iter().flatten()
    }

    pub fn final_match(&self) -> Option<&Match> {
        self.rounds.last().and_then(|r| r.first())
    }

    /// Overall winner, once the final is decided.
    pub fn champion(&self) -> Option<&Player> {
        self.final_match().and_then(Match::advancing_player)
    }

    /// Rebuild `players` from the match slots, keeping first-seen order.
    pub fn collect_players(&mut self) {
        let mut players: Vec<Player> = Vec::new();
        for m in self.rounds.iter().flatten() {
            for p in [&m.player1, &m.player2].into_iter().flatten() {
                if !players.iter().any(|known| known.is(p)) {
                    players.push(p.clone());
                }
            }
        }
        self.players = players;
    }

    pub fn is_placement(&self) -> bool {
        self.placement.is_some()
    }
}
