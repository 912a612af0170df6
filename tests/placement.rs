//! Integration tests for placement sub-brackets, explicit and derived.

use serde_json::{json, Value};
use tournament_bracket_web::render::layout::{BracketLayout, CanvasLayout, Point};
use tournament_bracket_web::{
    build_bracket, derived_placement_brackets, Locale, PlacementKey, TournamentBracket,
    TournamentStateDocument,
};

fn participants(n: usize) -> Value {
    let map: serde_json::Map<String, Value> = (1..=n)
        .map(|i| (i.to_string(), json!({"name": format!("Player {i}")})))
        .collect();
    Value::Object(map)
}

fn decided(round: usize, match_number: usize, p1: usize, p2: usize, winner: usize) -> Value {
    json!({
        "round": round,
        "match_number": match_number,
        "player1_id": p1.to_string(),
        "player2_id": p2.to_string(),
        "winner_id": winner.to_string()
    })
}

fn doc(n: usize, matches: Vec<Value>) -> TournamentStateDocument {
    serde_json::from_value(json!({"name": "Cup", "participants": participants(n), "matches": matches})).unwrap()
}

fn ids(bracket: &TournamentBracket, round: usize, m: usize) -> (Option<&str>, Option<&str>) {
    let m = &bracket.rounds[round][m];
    (
        m.player1.as_ref().map(|p| p.id.as_str()),
        m.player2.as_ref().map(|p| p.id.as_str()),
    )
}

#[test]
fn placement_tags_are_normalized() {
    assert_eq!(PlacementKey::from_tag("3rd"), Some(PlacementKey::Third));
    assert_eq!(PlacementKey::from_tag("5-8"), Some(PlacementKey::FifthSixth));
    assert_eq!(PlacementKey::from_tag(" 5th "), Some(PlacementKey::FifthSixth));
    assert_eq!(PlacementKey::from_tag("5-6"), Some(PlacementKey::FifthSixth));
    assert_eq!(PlacementKey::from_tag("7th"), Some(PlacementKey::Seventh));
    assert_eq!(PlacementKey::from_tag("9-12"), Some(PlacementKey::Other("9-12".to_string())));
    assert_eq!(PlacementKey::from_tag("  "), None);
    assert_eq!(PlacementKey::FifthSixth.as_str(), "5-6");
}

#[test]
fn explicit_placement_records_are_grouped() {
    let mut matches = vec![
        decided(0, 0, 1, 2, 1),
        decided(0, 1, 3, 4, 3),
        decided(0, 2, 5, 6, 5),
        decided(0, 3, 7, 8, 7),
    ];
    matches.extend([
        json!({"round": 0, "match_number": 0, "placement": "3rd", "player1_id": "2", "player2_id": "4"}),
        json!({"round": 0, "match_number": 0, "placement": "5-8", "player1_id": "6", "player2_id": "8", "winner_id": "6"}),
        json!({"round": 0, "match_number": 1, "placement": "5-8", "player1_id": "5", "player2_id": "7", "winner_id": "7"}),
        json!({"round": 1, "match_number": 0, "placement": "5th"}),
        json!({"round": 0, "match_number": 0, "placement": "7th", "player1_id": "5", "player2_id": "8"}),
    ]);
    let bracket = build_bracket(&doc(8, matches), &[], &[], Locale::En);

    let keys: Vec<Option<&PlacementKey>> =
        bracket.additional_tournaments.iter().map(|b| b.placement.as_ref()).collect();
    assert_eq!(
        keys,
        vec![Some(&PlacementKey::Third), Some(&PlacementKey::FifthSixth), Some(&PlacementKey::Seventh)]
    );

    let third = &bracket.additional_tournaments[0];
    assert_eq!(third.name, "3rd place match");
    assert_eq!(third.rounds.len(), 1);
    assert_eq!(ids(third, 0, 0), (Some("2"), Some("4")));

    let fifth = &bracket.additional_tournaments[1];
    assert_eq!(fifth.name, "5th-6th place match");
    assert_eq!(fifth.rounds.len(), 2);
    assert_eq!(fifth.rounds[0].len(), 2);
    assert_eq!(ids(fifth, 1, 0), (Some("6"), Some("7")));
    assert!(fifth.matches().all(|m| m.is_placement));

    // Placement records never leak into the main draw.
    assert!(bracket.matches().all(|m| !m.is_placement));
    assert_eq!(ids(&bracket, 1, 0), (Some("1"), Some("3")));
}

#[test]
fn semifinal_losers_play_for_third() {
    let matches = vec![decided(0, 0, 1, 2, 1), decided(0, 1, 3, 4, 4)];
    let bracket = build_bracket(&doc(4, matches), &[], &[], Locale::En);
    assert_eq!(bracket.additional_tournaments.len(), 1);
    let third = &bracket.additional_tournaments[0];
    assert_eq!(third.placement, Some(PlacementKey::Third));
    assert_eq!(ids(third, 0, 0), (Some("2"), Some("3")));
}

#[test]
fn one_known_semifinal_loser_still_gets_a_third_place_match() {
    let matches = vec![
        decided(0, 0, 1, 2, 2),
        json!({"round": 0, "match_number": 1, "player1_id": "3", "player2_id": "4"}),
    ];
    let bracket = build_bracket(&doc(4, matches), &[], &[], Locale::En);
    let third = &bracket.additional_tournaments[0];
    assert_eq!(ids(third, 0, 0), (Some("1"), None));
    // TBD opponent, not a walkover.
    assert!(!third.rounds[0][0].is_bye);
    assert_eq!(third.rounds[0][0].winner, None);
}

#[test]
fn quarterfinal_losers_fill_a_four_player_draw() {
    let matches = vec![
        decided(0, 0, 1, 2, 1),
        decided(0, 1, 3, 4, 3),
        decided(0, 2, 5, 6, 6),
        decided(0, 3, 7, 8, 8),
        decided(1, 0, 1, 3, 1),
        decided(1, 1, 6, 8, 8),
    ];
    let bracket = build_bracket(&doc(8, matches), &[], &[], Locale::En);
    assert_eq!(bracket.additional_tournaments.len(), 2);

    let third = &bracket.additional_tournaments[0];
    assert_eq!(ids(third, 0, 0), (Some("3"), Some("6")));

    let fifth = &bracket.additional_tournaments[1];
    assert_eq!(fifth.placement, Some(PlacementKey::FifthEighth));
    assert_eq!(fifth.name, "5th-8th place");
    assert_eq!(fifth.rounds.len(), 2);
    assert_eq!(ids(fifth, 0, 0), (Some("2"), Some("4")));
    assert_eq!(ids(fifth, 0, 1), (Some("5"), Some("7")));
}

#[test]
fn partial_placement_draws_still_lay_out() {
    // Only two quarterfinals decided: the 5th-8th draw has two known entrants.
    let matches = vec![
        decided(0, 0, 1, 2, 1),
        decided(0, 1, 3, 4, 4),
        json!({"round": 0, "match_number": 3, "player1_id": "7", "player2_id": "8"}),
    ];
    let bracket = build_bracket(&doc(8, matches), &[], &[], Locale::En);
    assert_eq!(bracket.rounds.len(), 3);
    let derived = derived_placement_brackets(&bracket, &[], Locale::En);
    assert_eq!(derived.len(), 1);
    let fifth = &derived[0];
    assert_eq!(ids(fifth, 0, 0), (Some("2"), Some("3")));
    assert_eq!(ids(fifth, 0, 1), (None, None));
    assert!(fifth.matches().all(|m| !m.is_bye));

    for sub in &derived {
        let layout = BracketLayout::compute(sub, Point::new(0.0, 0.0));
        assert_eq!(layout.rounds.len(), sub.rounds.len());
        assert!(layout.width > 0.0);
    }
    let canvas = CanvasLayout::compose(&bracket, None, 8);
    assert_eq!(canvas.placements.len(), bracket.additional_tournaments.len());
}

#[test]
fn no_placement_draws_without_results() {
    let bracket = build_bracket(&doc(8, Vec::new()), &[], &[], Locale::En);
    assert!(bracket.additional_tournaments.is_empty());
    assert!(derived_placement_brackets(&TournamentBracket::default(), &[], Locale::En).is_empty());
}

#[test]
fn fifth_to_eighth_draw_takes_the_first_round_losers() {
    // Sixteen entrants: round 0 has eight matches, round 1 is the quarterfinal.
    let mut matches: Vec<Value> = (0..8).map(|i| decided(0, i, 2 * i + 1, 2 * i + 2, 2 * i + 1)).collect();
    matches.extend((0..4).map(|j| decided(1, j, 4 * j + 1, 4 * j + 3, 4 * j + 1)));
    let bracket = build_bracket(&doc(16, matches), &[], &[], Locale::En);
    assert_eq!(bracket.rounds.len(), 4);

    // Semifinals are undecided, so only the 5th-8th draw is derived.
    assert_eq!(bracket.additional_tournaments.len(), 1);
    let fifth = &bracket.additional_tournaments[0];
    assert_eq!(fifth.placement, Some(PlacementKey::FifthEighth));
    assert_eq!(ids(fifth, 0, 0), (Some("2"), Some("4")));
    assert_eq!(ids(fifth, 0, 1), (Some("6"), Some("8")));
}

#[test]
fn small_first_round_gets_no_fifth_to_eighth_draw() {
    let matches = vec![decided(0, 0, 1, 2, 1), decided(0, 1, 3, 4, 3)];
    let derived = derived_placement_brackets(&build_bracket(&doc(4, matches), &[], &[], Locale::En), &[], Locale::En);
    assert!(derived.iter().all(|b| b.placement != Some(PlacementKey::FifthEighth)));
}
