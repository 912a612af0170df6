//! Plain-text caption listing the first-round pairings.

use crate::locale::Locale;
use crate::models::TournamentBracket;

/// Title line followed by one numbered line per populated first-round match.
pub fn first_round_summary(bracket: &TournamentBracket, locale: Locale) -> String {
    let mut lines = vec![bracket.name.clone(), locale.first_round_heading().to_string()];
    let first_round = bracket.rounds.first().map(Vec::as_slice).unwrap_or_default();
    let mut shown = 0;
    for m in first_round {
        let line = match (&m.player1, &m.player2) {
            (Some(a), Some(b)) => format!("{} {} {}", a.name, locale.versus(), b.name),
            (Some(p), None) | (None, Some(p)) => format!("{} ({})", p.name, locale.bye()),
            (None, None) => continue,
        };
        shown += 1;
        lines.push(format!("{}. {}", shown, line));
    }
    if shown == 0 {
        lines.push(locale.no_pairings().to_string());
    }
    lines.join("\n")
}
