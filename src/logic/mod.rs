//! Bracket business logic: participant normalization, reconstruction, results and
//! placement draws.

mod participants;
mod placement;
mod reconstruct;
mod results;
mod summary;

pub use participants::{
    normalize_participant, normalize_participants, ParticipantRecord, ParticipantSource,
};
pub use placement::derived_placement_brackets;
pub use reconstruct::{
    build_bracket, next_bracket_size, placeholder_bracket, rounds_from_slots, try_build_bracket,
    MAX_FIRST_ROUND_MATCHES, MAX_ROUNDS,
};
pub use results::{overlay_completed_games, propagate_winners};
pub use summary::first_round_summary;
