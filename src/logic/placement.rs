//! Placement sub-brackets (3rd place, 5th-8th place, ...).

use crate::locale::Locale;
use crate::logic::reconstruct::{grow_to_final, rounds_from_slots, PlayerLookup};
use crate::logic::results::{overlay_completed_games, propagate_winners};
use crate::models::{
    CompletedGameRecord, Match, MatchRecord, PlacementKey, Player, TournamentBracket,
};
use std::collections::BTreeMap;

fn placement_bracket(
    key: PlacementKey,
    mut rounds: Vec<Vec<Match>>,
    completed: &[CompletedGameRecord],
    locale: Locale,
) -> TournamentBracket {
    for m in rounds.iter_mut().flatten() {
        m.is_placement = true;
    }
    let mut bracket = TournamentBracket::from_rounds(locale.placement_name(&key), rounds);
    bracket.placement = Some(key);
    overlay_completed_games(&mut bracket, completed);
    propagate_winners(&mut bracket);
    bracket
}

/// One sub-bracket per normalized placement key, from placement-tagged records.
///
/// Records are ordered by round then match number; distinct round values become
/// consecutive rounds of the mini-draw and matches are renumbered by position.
pub(crate) fn explicit_placement_brackets(
    records: &[&MatchRecord],
    lookup: &PlayerLookup,
    completed: &[CompletedGameRecord],
) -> Vec<TournamentBracket> {
    let mut groups: BTreeMap<PlacementKey, Vec<&MatchRecord>> = BTreeMap::new();
    for record in records {
        if let Some(key) = record.placement.as_deref().and_then(PlacementKey::from_tag) {
            groups.entry(key).or_default().push(*record);
        }
    }

    groups
        .into_iter()
        .map(|(key, mut group)| {
            group.sort_by_key(|r| (r.round, r.match_number));
            let mut rounds: Vec<Vec<Match>> = Vec::new();
            let mut current_round = None;
            for record in group {
                if current_round != Some(record.round) {
                    current_round = Some(record.round);
                    rounds.push(Vec::new());
                }
                if let Some(round) = rounds.last_mut() {
                    let match_number = round.len();
                    round.push(lookup.materialize(record, match_number));
                }
            }
            grow_to_final(&mut rounds);
            placement_bracket(key, rounds, completed, lookup.locale())
        })
        .collect()
}

fn losers(round: &[Match]) -> Vec<Option<Player>> {
    round.iter().map(|m| m.loser().cloned()).collect()
}

/// Placement draws inferred from the main bracket when no placement records exist.
///
/// Semifinal losers meet for 3rd place. The first four losers of round 0, when round 0
/// has at least four matches, enter a 4-player 5th-8th place draw. In an 8-player
/// bracket these are the quarterfinal losers. Unknown losers stay TBD; a draw with no
/// known loser is left out.
pub fn derived_placement_brackets(
    main: &TournamentBracket,
    completed: &[CompletedGameRecord],
    locale: Locale,
) -> Vec<TournamentBracket> {
    let mut derived = Vec::new();
    let n = main.rounds.len();

    if n >= 2 {
        let mut semi_losers = losers(&main.rounds[n - 2]).into_iter();
        let (a, b) = (semi_losers.next().flatten(), semi_losers.next().flatten());
        if a.is_some() || b.is_some() {
            let third = Match {
                player1: a,
                player2: b,
                ..Match::placeholder(0)
            };
            derived.push(placement_bracket(PlacementKey::Third, vec![vec![third]], completed, locale));
        }
    }

    if main.rounds.first().is_some_and(|first| first.len() >= 4) {
        let mut slots = losers(&main.rounds[0]);
        slots.truncate(4);
        if slots.iter().any(Option::is_some) {
            let rounds = rounds_from_slots(slots, false);
            derived.push(placement_bracket(PlacementKey::FifthEighth, rounds, completed, locale));
        }
    }

    derived
}
