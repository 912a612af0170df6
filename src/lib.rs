//! Tournament bracket engine: rebuilds a single-elimination bracket from the bot's
//! tournament state and renders it as a PNG with a short text caption.

pub mod config;
pub mod locale;
pub mod logic;
pub mod models;
pub mod render;

pub use config::RenderConfig;
pub use locale::Locale;
pub use logic::{
    build_bracket, derived_placement_brackets, first_round_summary, next_bracket_size,
    normalize_participant, normalize_participants, overlay_completed_games, placeholder_bracket,
    propagate_winners, rounds_from_slots, try_build_bracket, ParticipantRecord, ParticipantSource,
};
pub use models::{
    lenient, lenient_list, BracketError, CompletedGameRecord, Match, MatchRecord, ParticipantInfo,
    ParticipantList, PlacementKey, Player, PlayerId, Rosters, Side, TournamentBracket,
    TournamentStateDocument, TournamentType,
};
pub use render::{RenderError, Scene};

use std::panic::{catch_unwind, AssertUnwindSafe};

/// Outcome of a render request. Both variants carry a PNG and a caption; `Degraded`
/// holds an error image instead of the bracket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderResult {
    Ok { png: Vec<u8>, summary: String },
    Degraded { png: Vec<u8>, summary: String, reason: String },
}

impl RenderResult {
    pub fn png(&self) -> &[u8] {
        match self {
            RenderResult::Ok { png, .. } | RenderResult::Degraded { png, .. } => png,
        }
    }

    pub fn summary(&self) -> &str {
        match self {
            RenderResult::Ok { summary, .. } | RenderResult::Degraded { summary, .. } => summary,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, RenderResult::Degraded { .. })
    }

    pub fn into_parts(self) -> (Vec<u8>, String) {
        match self {
            RenderResult::Ok { png, summary } | RenderResult::Degraded { png, summary, .. } => (png, summary),
        }
    }

    fn degraded(reason: String, summary: String, locale: Locale) -> Self {
        RenderResult::Degraded {
            png: render::error_image(&reason, locale),
            summary,
            reason,
        }
    }
}

/// Media of completed games, resolved under the media directory. None when there are no
/// completed games at all (no photo strip is drawn then).
pub fn completed_media(completed: &[CompletedGameRecord], config: &RenderConfig) -> Option<Vec<std::path::PathBuf>> {
    if completed.is_empty() {
        return None;
    }
    Some(
        completed
            .iter()
            .filter_map(|g| g.media_filename.as_deref())
            .take(config.max_photos)
            .map(|name| config.media_path(name))
            .collect(),
    )
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unexpected failure while drawing".to_string())
}

/// Rebuild the bracket and draw it. Never fails: problems come back as
/// [`RenderResult::Degraded`] with an error image.
pub fn render_tournament<P: ParticipantSource>(
    doc: &TournamentStateDocument,
    participants: &[P],
    completed: &[CompletedGameRecord],
    config: &RenderConfig,
) -> RenderResult {
    let locale = config.locale;
    if doc.tournament_type == TournamentType::RoundRobin {
        let reason = locale.round_robin_unsupported().to_string();
        return RenderResult::degraded(reason.clone(), reason, locale);
    }

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let fallback = normalize_participants(participants, locale);
        let bracket = build_bracket(doc, &fallback, completed, locale);
        let summary = first_round_summary(&bracket, locale);
        let scene = Scene {
            bracket: &bracket,
            photos: completed_media(completed, config),
            updated_at: doc.updated_at,
        };
        (render::render_scene(&scene, config), summary)
    }));

    match outcome {
        Ok((Ok(png), summary)) => RenderResult::Ok { png, summary },
        Ok((Err(e), summary)) => {
            log::warn!("Rendering {:?} degraded: {}", doc.name, e);
            RenderResult::degraded(e.to_string(), summary, locale)
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            log::error!("Rendering {:?} panicked: {}", doc.name, reason);
            RenderResult::degraded(reason.clone(), reason, locale)
        }
    }
}
