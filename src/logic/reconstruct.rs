//! Bracket reconstruction: turns a possibly incomplete tournament-state document into a
//! full single-elimination tree.
//!
//! 1. Build the id -> player lookup from `participants`, enriched by the fallback list.
//! 2. No main-draw records: seed a placeholder bracket from the fallback order.
//! 3. Otherwise group records by round and place them by `match_number`.
//! 4. Grow placeholder rounds until a single final remains.
//! 5. Backfill scores/winners from completed games.
//! 6. Propagate winners forward.
//! 7. Attach placement sub-brackets.

use crate::locale::Locale;
use crate::logic::placement::{derived_placement_brackets, explicit_placement_brackets};
use crate::logic::results::{overlay_completed_games, propagate_winners};
use crate::models::{
    BracketError, CompletedGameRecord, Match, MatchRecord, Player, PlayerId, TournamentBracket,
    TournamentStateDocument,
};
use std::collections::{BTreeMap, HashMap};

/// Deepest bracket we reconstruct (65536 first-round matches).
pub const MAX_ROUNDS: usize = 16;

/// Largest accepted first-round match count coming from records.
pub const MAX_FIRST_ROUND_MATCHES: usize = 1024;

/// Number of first-round slots for `participants` entrants: the next power of two, at least 2.
pub fn next_bracket_size(participants: usize) -> usize {
    participants.max(2).next_power_of_two()
}

/// Id -> player table with the locale used for unknown ids.
pub(crate) struct PlayerLookup {
    players: HashMap<PlayerId, Player>,
    locale: Locale,
}

impl PlayerLookup {
    /// `participants` values win; `fallback` only fills what is missing.
    pub(crate) fn new(doc: &TournamentStateDocument, fallback: &[Player], locale: Locale) -> Self {
        let mut players: HashMap<PlayerId, Player> = HashMap::new();
        let mut named: HashMap<PlayerId, bool> = HashMap::new();
        for (id, info) in &doc.participants {
            let id = id.trim().to_string();
            if id.is_empty() {
                continue;
            }
            named.insert(id.clone(), info.name.is_some());
            let player = Player {
                id: id.clone(),
                name: info
                    .name
                    .clone()
                    .unwrap_or_else(|| locale.default_player_name().to_string()),
                photo_url: info.photo().map(str::to_string),
                initial: None,
            };
            players.insert(id, player);
        }
        for extra in fallback {
            match players.get_mut(&extra.id) {
                Some(known) => {
                    if !named.get(&extra.id).copied().unwrap_or(true) {
                        known.name = extra.name.clone();
                    }
                    if known.photo_url.is_none() {
                        known.photo_url = extra.photo_url.clone();
                    }
                    if known.initial.is_none() {
                        known.initial = extra.initial.clone();
                    }
                }
                None => {
                    players.insert(extra.id.clone(), extra.clone());
                }
            }
        }
        Self { players, locale }
    }

    /// Known player, or a default-named one so the slot is not lost.
    pub(crate) fn resolve(&self, id: &str) -> Player {
        self.players
            .get(id)
            .cloned()
            .unwrap_or_else(|| Player::new(id, self.locale.default_player_name()))
    }

    /// Build a match from a record. The winner reuses the slot's player when ids agree.
    pub(crate) fn materialize(&self, record: &MatchRecord, match_number: usize) -> Match {
        let player1 = record.player1_id.as_deref().map(|id| self.resolve(id));
        let player2 = record.player2_id.as_deref().map(|id| self.resolve(id));
        let winner = record.winner_id.as_deref().map(|id| {
            [&player1, &player2]
                .into_iter()
                .flatten()
                .find(|p| p.id == id)
                .cloned()
                .unwrap_or_else(|| self.resolve(id))
        });
        Match {
            player1,
            player2,
            winner,
            score: record.score.clone(),
            is_bye: record.is_bye,
            match_number,
            is_placement: record.is_placement(),
        }
    }

    pub(crate) fn locale(&self) -> Locale {
        self.locale
    }

    /// Enriched copies of the fallback list, in its order.
    fn ordered(&self, fallback: &[Player], doc: &TournamentStateDocument) -> Vec<Player> {
        if fallback.is_empty() {
            doc.participants.iter().map(|(id, _)| self.resolve(id)).collect()
        } else {
            fallback.iter().map(|p| self.resolve(&p.id)).collect()
        }
    }
}

/// Pair padded slots into round 0 and add every later round up to the final.
///
/// With `byes`, a match holding a single player is a bye won by that player; otherwise
/// empty slots are simply undecided.
pub fn rounds_from_slots(mut slots: Vec<Option<Player>>, byes: bool) -> Vec<Vec<Match>> {
    slots.resize(next_bracket_size(slots.len()), None);
    let mut pairs = slots.into_iter();
    let mut first = Vec::new();
    while let (Some(a), Some(b)) = (pairs.next(), pairs.next()) {
        let match_number = first.len();
        first.push(if byes {
            Match::pairing(match_number, a, b)
        } else {
            Match {
                player1: a,
                player2: b,
                match_number,
                ..Match::default()
            }
        });
    }
    let mut rounds = vec![first];
    grow_to_final(&mut rounds);
    rounds
}

/// Placeholder bracket seeded in the given order. Order is never changed: it reflects the
/// bot's earlier seeding.
pub fn placeholder_bracket(participants: &[Player], name: impl Into<String>) -> TournamentBracket {
    let slots = participants.iter().cloned().map(Some).collect();
    let mut bracket = TournamentBracket::from_rounds(name, rounds_from_slots(slots, true));
    propagate_winners(&mut bracket);
    bracket
}

/// Append placeholder rounds, halving each time, until a round holds a single match.
pub(crate) fn grow_to_final(rounds: &mut Vec<Vec<Match>>) {
    if rounds.is_empty() {
        rounds.push(vec![Match::placeholder(0)]);
    }
    while let Some(last) = rounds.last() {
        if last.len() <= 1 {
            break;
        }
        let next = last.len().div_ceil(2);
        rounds.push((0..next).map(Match::placeholder).collect());
    }
}

fn index(value: i64, record: &MatchRecord) -> Result<usize, BracketError> {
    usize::try_from(value).map_err(|_| BracketError::NegativeIndex {
        round: record.round,
        match_number: record.match_number,
    })
}

/// Steps 3 and 4: main-draw records laid out by round and match number.
fn rounds_from_records(
    records: &[&MatchRecord],
    lookup: &PlayerLookup,
) -> Result<Vec<Vec<Match>>, BracketError> {
    let mut by_round: BTreeMap<usize, Vec<(usize, &MatchRecord)>> = BTreeMap::new();
    for record in records {
        let round = index(record.round, record)?;
        let match_number = index(record.match_number, record)?;
        if round >= MAX_ROUNDS {
            return Err(BracketError::TooManyRounds(round + 1));
        }
        by_round.entry(round).or_default().push((match_number, *record));
    }
    for entries in by_round.values_mut() {
        entries.sort_by_key(|(n, _)| *n);
    }

    // Round 0 must be wide enough for every recorded match of every round.
    let mut first_round = 1usize;
    for (&round, entries) in &by_round {
        let widest = entries.last().map_or(1, |(n, _)| n + 1);
        let capacity = MAX_FIRST_ROUND_MATCHES >> round;
        if widest > capacity {
            return Err(BracketError::MatchNumberOutOfRange {
                round,
                match_number: widest - 1,
                capacity,
            });
        }
        first_round = first_round.max(widest << round);
    }
    let first_round = first_round.next_power_of_two();
    let final_round = first_round.trailing_zeros() as usize;

    let mut rounds: Vec<Vec<Match>> = Vec::new();
    for round in 0..=final_round {
        let capacity = first_round >> round;
        let mut matches: Vec<Match> = (0..capacity).map(Match::placeholder).collect();
        let mut filled = vec![false; capacity];
        for (match_number, record) in by_round.remove(&round).unwrap_or_default() {
            if filled[match_number] {
                log::warn!(
                    "Duplicate record for round {} match {}, keeping the first",
                    round,
                    match_number
                );
                continue;
            }
            filled[match_number] = true;
            matches[match_number] = lookup.materialize(record, match_number);
        }
        rounds.push(matches);
    }
    grow_to_final(&mut rounds);
    Ok(rounds)
}

/// Steps 5-8 on an already laid out main draw.
fn finish_bracket(
    doc: &TournamentStateDocument,
    rounds: Vec<Vec<Match>>,
    lookup: &PlayerLookup,
    completed: &[CompletedGameRecord],
) -> TournamentBracket {
    let mut bracket = TournamentBracket::from_rounds(tournament_name(doc, lookup.locale()), rounds);
    bracket.tournament_type = doc.tournament_type;
    overlay_completed_games(&mut bracket, completed);
    propagate_winners(&mut bracket);

    let placement: Vec<&MatchRecord> = doc.placement_records().collect();
    bracket.additional_tournaments = if placement.is_empty() {
        derived_placement_brackets(&bracket, completed, lookup.locale())
    } else {
        explicit_placement_brackets(&placement, lookup, completed)
    };
    bracket.collect_players();
    bracket
}

fn tournament_name(doc: &TournamentStateDocument, locale: Locale) -> String {
    let name = doc.name.trim();
    if name.is_empty() {
        locale.default_tournament_name().to_string()
    } else {
        name.to_string()
    }
}

/// Reconstruct the full bracket, reporting structural problems in the records.
pub fn try_build_bracket(
    doc: &TournamentStateDocument,
    fallback: &[Player],
    completed: &[CompletedGameRecord],
    locale: Locale,
) -> Result<TournamentBracket, BracketError> {
    let lookup = PlayerLookup::new(doc, fallback, locale);
    let records: Vec<&MatchRecord> = doc.main_draw_records().collect();
    let rounds = if records.is_empty() {
        let ordered = lookup.ordered(fallback, doc);
        if ordered.len() > MAX_FIRST_ROUND_MATCHES * 2 {
            return Err(BracketError::TooManyRounds(
                next_bracket_size(ordered.len()).trailing_zeros() as usize,
            ));
        }
        rounds_from_slots(ordered.into_iter().map(Some).collect(), true)
    } else {
        rounds_from_records(&records, &lookup)?
    };
    Ok(finish_bracket(doc, rounds, &lookup, completed))
}

/// Reconstruct the full bracket. Never fails: a document that cannot be laid out degrades
/// to the placeholder bracket of the fallback participants.
pub fn build_bracket(
    doc: &TournamentStateDocument,
    fallback: &[Player],
    completed: &[CompletedGameRecord],
    locale: Locale,
) -> TournamentBracket {
    match try_build_bracket(doc, fallback, completed, locale) {
        Ok(bracket) => bracket,
        Err(e) => {
            log::warn!("Falling back to placeholder bracket for {:?}: {}", doc.name, e);
            let lookup = PlayerLookup::new(doc, fallback, locale);
            let mut ordered = lookup.ordered(fallback, doc);
            ordered.truncate(MAX_FIRST_ROUND_MATCHES * 2);
            let rounds = rounds_from_slots(ordered.into_iter().map(Some).collect(), true);
            let stripped = TournamentStateDocument {
                matches: Vec::new(),
                ..doc.clone()
            };
            finish_bracket(&stripped, rounds, &lookup, completed)
        }
    }
}
