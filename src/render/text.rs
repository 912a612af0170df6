//! Text cleanup and shortening for labels drawn on the bracket.

use crate::models::Player;

fn is_pictographic(c: char) -> bool {
    matches!(
        c as u32,
        0x1F000..=0x1FAFF   // emoji, symbols, flags, supplemental pictographs
            | 0x2600..=0x27BF   // misc symbols, dingbats
            | 0x2300..=0x23FF   // misc technical (watch, hourglass, ...)
            | 0x2B00..=0x2BFF   // arrows, stars
            | 0xFE00..=0xFE0F   // variation selectors
            | 0x200D            // zero width joiner
            | 0x20E3            // combining keycap
            | 0xE0020..=0xE007F // tag characters
    )
}

/// Remove emoji and other pictographs, collapsing the whitespace they leave behind.
pub fn strip_pictographs(text: &str) -> String {
    let cleaned: String = text.chars().filter(|c| !is_pictographic(*c)).collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Printable ASCII only, whitespace collapsed.
pub fn ascii_fallback(text: &str) -> String {
    let ascii: String = text
        .chars()
        .map(|c| if c.is_ascii_graphic() { c } else { ' ' })
        .collect();
    ascii.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// "FirstName LastName" -> "F. LastName". A single token is returned as is.
pub fn short_name(name: &str) -> String {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    match tokens.as_slice() {
        [] => String::new(),
        [only] => only.to_string(),
        [first, .., last] => match first.chars().next() {
            Some(initial) => format!("{}. {}", initial, last),
            None => last.to_string(),
        },
    }
}

/// Letters drawn on a placeholder avatar: the `initial` override, or the first letter of
/// up to two name tokens.
pub fn initials(player: &Player) -> String {
    if let Some(initial) = player.initial.as_deref() {
        let initial = initial.trim();
        if !initial.is_empty() {
            return initial.chars().take(2).flat_map(char::to_uppercase).collect();
        }
    }
    let letters: String = strip_pictographs(&player.name)
        .split_whitespace()
        .filter_map(|token| token.chars().find(|c| c.is_alphanumeric()))
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();
    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

/// Characters of a label that are ever measured. Longer input is always cut.
pub const MAX_MEASURED_CHARS: usize = 200;

/// Longest prefix of `text` (plus "...") whose width, as given by `width_of`, fits
/// `max_width`. Widths grow with the prefix, so the cut point is found by bisection.
pub fn truncate_to_width(text: &str, max_width: u32, width_of: impl Fn(&str) -> u32) -> String {
    let chars: Vec<char> = text.chars().take(MAX_MEASURED_CHARS + 1).collect();
    if chars.len() <= MAX_MEASURED_CHARS && width_of(text) <= max_width {
        return text.to_string();
    }
    let chars = &chars[..chars.len().min(MAX_MEASURED_CHARS)];
    let candidate = |keep: usize| chars[..keep].iter().collect::<String>().trim_end().to_string() + "...";
    let fits = |keep: usize| width_of(&candidate(keep)) <= max_width;
    if !fits(0) {
        return String::new();
    }
    // Invariant: `lo` fits, every keep >= `hi` does not.
    let (mut lo, mut hi) = (0, chars.len());
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if fits(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    candidate(lo)
}
