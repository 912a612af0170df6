//! Data structures for bracket rendering: players, matches, brackets and input documents.

mod game;
mod player;
mod state;
mod tournament;

pub use game::{Match, Side};
pub use player::{Player, PlayerId};
pub(crate) use state::id_from_value;
pub use state::{
    lenient, lenient_list, CompletedGameRecord, MatchRecord, ParticipantInfo, ParticipantList,
    Rosters, TournamentStateDocument,
};
pub use tournament::{BracketError, PlacementKey, TournamentBracket, TournamentType};
