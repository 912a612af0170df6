//! Results: backfilling from completed games and moving winners into later rounds.

use crate::models::{CompletedGameRecord, Match, Player, Side, TournamentBracket};

/// Fill missing scores/winners of `bracket`'s matches from completed-game records.
///
/// A record applies when the two sides of the match sit on opposite rosters. Recorded
/// values are never replaced. Returns the number of matches that changed.
pub fn overlay_completed_games(
    bracket: &mut TournamentBracket,
    completed: &[CompletedGameRecord],
) -> usize {
    if completed.is_empty() {
        return 0;
    }
    bracket
        .rounds
        .iter_mut()
        .flatten()
        .map(|m| apply_completed_game(m, completed))
        .filter(|changed| *changed)
        .count()
}

fn apply_completed_game(m: &mut Match, completed: &[CompletedGameRecord]) -> bool {
    if m.has_score() && m.winner.is_some() {
        return false;
    }
    let (Some(p1), Some(p2)) = (m.player1.clone(), m.player2.clone()) else {
        return false;
    };
    let mut candidates = completed.iter().filter(|g| g.pits(&p1.id, &p2.id));
    let Some(game) = candidates.next() else {
        return false;
    };
    let rematches = candidates.count();
    if rematches > 0 {
        // First record in iteration order wins.
        log::debug!(
            "{} vs {} has {} more completed games, using the first",
            p1.id,
            p2.id,
            rematches
        );
    }

    let mut changed = false;
    if !m.has_score() {
        if let Some(score) = &game.score {
            m.score = Some(score.clone());
            changed = true;
        }
    }
    if m.winner.is_none() {
        if let Some(winner) = completed_winner(game, &p1, &p2) {
            m.winner = Some(winner);
            changed = true;
        }
    }
    changed
}

/// Winner among `p1`/`p2` according to the record: the winner id itself, or the side
/// whose roster contains it.
fn completed_winner(game: &CompletedGameRecord, p1: &Player, p2: &Player) -> Option<Player> {
    let winner_id = game.winner_id.as_deref()?;
    if winner_id == p1.id {
        return Some(p1.clone());
    }
    if winner_id == p2.id {
        return Some(p2.clone());
    }
    let winning_team_has = |id: &str| {
        (game.in_team1(winner_id) && game.in_team1(id))
            || (game.in_team2(winner_id) && game.in_team2(id))
    };
    if winning_team_has(&p1.id) {
        Some(p1.clone())
    } else if winning_team_has(&p2.id) {
        Some(p2.clone())
    } else {
        None
    }
}

fn feeder_side(feeder: usize) -> Side {
    if feeder % 2 == 0 {
        Side::One
    } else {
        Side::Two
    }
}

/// Whether a match can never produce a player: round 0 with both slots empty, or a later
/// empty match fed only by such matches.
fn dead_matches(round: &[Match], feeders: Option<&[bool]>) -> Vec<bool> {
    round
        .iter()
        .enumerate()
        .map(|(j, m)| {
            let empty = m.player1.is_none() && m.player2.is_none();
            match feeders {
                None => empty,
                Some(prev) => {
                    let a = prev.get(2 * j).copied().unwrap_or(true);
                    let b = prev.get(2 * j + 1).copied().unwrap_or(true);
                    empty && a && b
                }
            }
        })
        .collect()
}

/// Mark one-sided matches whose empty side can never be filled as byes.
///
/// This applies to every round, not only round 0: a later-round match whose missing side
/// is fed by two empty (dead) matches also becomes a bye, so its lone player advances.
fn mark_walkovers(round: &mut [Match], feeders: Option<&[bool]>) -> bool {
    let mut changed = false;
    for (j, m) in round.iter_mut().enumerate() {
        if m.is_bye {
            continue;
        }
        let walkover = match (feeders, &m.player1, &m.player2) {
            (None, Some(_), None) | (None, None, Some(_)) => true,
            (Some(prev), Some(_), None) => prev.get(2 * j + 1).copied().unwrap_or(true),
            (Some(prev), None, Some(_)) => prev.get(2 * j).copied().unwrap_or(true),
            _ => false,
        };
        if walkover {
            m.is_bye = true;
            changed = true;
        }
    }
    changed
}

/// Move each round's winners into the next round's slots, round by round.
///
/// Match `i` feeds slot `i % 2` of match `i / 2` in the following round, which is created
/// when missing. A photo already on the target slot is kept. In the main draw (no
/// placement key) one-sided matches facing an empty branch become byes in any round,
/// so a player whose whole opposing subtree is empty walks through it. Stale winners
/// are cleared once slots are filled. Running it again changes nothing; returns whether
/// anything changed.
pub fn propagate_winners(bracket: &mut TournamentBracket) -> bool {
    let main_draw = !bracket.is_placement();
    let mut changed = false;
    let mut dead: Option<Vec<bool>> = None;
    let mut r = 0;
    while r < bracket.rounds.len() {
        let round = &mut bracket.rounds[r];
        if main_draw {
            changed |= mark_walkovers(round, dead.as_deref());
        }
        for m in round.iter_mut() {
            changed |= m.settle_winner();
        }
        dead = Some(dead_matches(round, dead.as_deref()));

        let len = round.len();
        if len <= 1 {
            break;
        }
        let winners: Vec<Option<Player>> =
            round.iter().map(|m| m.advancing_player().cloned()).collect();
        if r + 1 == bracket.rounds.len() {
            bracket
                .rounds
                .push((0..len.div_ceil(2)).map(Match::placeholder).collect());
            changed = true;
        }
        let next = &mut bracket.rounds[r + 1];
        for (i, winner) in winners.into_iter().enumerate() {
            let Some(winner) = winner else { continue };
            let j = i / 2;
            while next.len() <= j {
                next.push(Match::placeholder(next.len()));
                changed = true;
            }
            let slot = next[j].slot_mut(feeder_side(i));
            let incoming = match slot.as_ref() {
                Some(existing) => winner.merged_with(existing),
                None => winner,
            };
            if slot.as_ref() != Some(&incoming) {
                *slot = Some(incoming);
                changed = true;
            }
        }
        r += 1;
    }
    if changed {
        bracket.collect_players();
    }
    changed
}
