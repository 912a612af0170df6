//! Integration tests for text helpers, layout geometry, configuration and PNG output.

use image::{DynamicImage, Rgba, RgbaImage};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tournament_bracket_web::render::avatar::{load_square, square_crop};
use tournament_bracket_web::render::fonts::FontSet;
use tournament_bracket_web::render::layout::{
    BracketLayout, CanvasLayout, Point, AVATAR_SIZE, CELL_HEIGHT, CELL_WIDTH, FINAL_TAIL, MARGIN,
    PLACEMENT_GAP, RISER_OFFSET, ROUND_SPACING, THUMB_SIZE,
};
use tournament_bracket_web::render::text::{
    initials, short_name, strip_pictographs, truncate_to_width, MAX_MEASURED_CHARS,
};
use tournament_bracket_web::render::{error_image, printable_or, render_scene};
use tournament_bracket_web::{
    build_bracket, placeholder_bracket, render_tournament, CompletedGameRecord, Locale, Player,
    ParticipantSource, PlayerId, RenderConfig, RenderError, RenderResult, Scene,
    TournamentStateDocument,
};

const MARKER: Rgba<u8> = Rgba([10, 200, 30, 255]);
const OTHER: Rgba<u8> = Rgba([20, 40, 220, 255]);

fn players(n: usize) -> Vec<Player> {
    (1..=n).map(|i| Player::new(i.to_string(), format!("Player Number{i}"))).collect()
}

fn no_participants() -> Vec<Map<String, Value>> {
    Vec::new()
}

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bracket-render-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &Path, image: &RgbaImage) {
    image.save(path).unwrap();
}

fn two_player_doc(player1: Value, winner: Option<&str>) -> TournamentStateDocument {
    serde_json::from_value(json!({
        "name": "Final",
        "participants": {"1": player1, "2": {"name": "Bob"}},
        "matches": [{"round": 0, "match_number": 0, "player1_id": "1", "player2_id": "2", "winner_id": winner}]
    }))
    .unwrap()
}

fn decode(result: &RenderResult) -> RgbaImage {
    assert!(!result.is_degraded(), "{:?}", result.summary());
    image::load_from_memory(result.png()).unwrap().to_rgba8()
}

/// Pixels of the rectangle with top-left (`x`, `y`).
fn region(image: &RgbaImage, x: f32, y: f32, w: f32, h: f32) -> Vec<Rgba<u8>> {
    let (x, y) = (x.round() as u32, y.round() as u32);
    (y..y + h as u32)
        .flat_map(|py| (x..x + w as u32).map(move |px| (px, py)))
        .map(|(px, py)| *image.get_pixel(px, py))
        .collect()
}

/// Participant whose name lookup blows up.
struct Exploding;

impl ParticipantSource for Exploding {
    fn id(&self) -> Option<PlayerId> {
        Some("1".to_string())
    }
    fn name(&self) -> Option<String> {
        panic!("name lookup exploded")
    }
    fn photo_url(&self) -> Option<String> {
        None
    }
    fn initial(&self) -> Option<String> {
        None
    }
}

#[test]
fn short_names_abbreviate_the_first_token() {
    assert_eq!(short_name("Anna Maria Petrova"), "A. Petrova");
    assert_eq!(short_name("  Ivan   Ivanov "), "I. Ivanov");
    assert_eq!(short_name("Solo"), "Solo");
    assert_eq!(short_name(""), "");
}

#[test]
fn pictographs_are_removed() {
    assert_eq!(strip_pictographs("🎯 Open 🔥 Cup"), "Open Cup");
    assert_eq!(strip_pictographs("Кубок ✨"), "Кубок");
    assert_eq!(strip_pictographs("🏆"), "");
}

#[test]
fn initials_prefer_the_override() {
    assert_eq!(initials(&Player::new("1", "ann lee")), "AL");
    assert_eq!(initials(&Player::new("1", "Ann Lee").with_initial("x")), "X");
    assert_eq!(initials(&Player::new("1", "🎯")), "?");
    assert_eq!(initials(&Player::new("1", "Мария")), "М");
}

#[test]
fn truncation_appends_dots() {
    let width = |t: &str| t.chars().count() as u32 * 10;
    assert_eq!(truncate_to_width("short", 100, width), "short");
    assert_eq!(truncate_to_width("a much longer name", 80, width), "a muc...");
    assert_eq!(truncate_to_width("abc", 20, width), "");
}

#[test]
fn very_long_names_are_measured_in_bounded_pieces() {
    let calls = std::cell::Cell::new(0usize);
    let longest = std::cell::Cell::new(0usize);
    let width = |t: &str| {
        calls.set(calls.get() + 1);
        longest.set(longest.get().max(t.chars().count()));
        t.chars().count() as u32 * 10
    };
    let name = "x".repeat(100_000);
    let cut = truncate_to_width(&name, 500, width);
    assert_eq!(cut, format!("{}...", "x".repeat(47)));
    assert!(calls.get() < 20, "{} measurements", calls.get());
    assert!(longest.get() <= MAX_MEASURED_CHARS + 3);

    // A long name that would fit is still cut at the measuring limit.
    let wide = truncate_to_width(&name, u32::MAX, |t: &str| t.chars().count() as u32);
    assert!(wide.ends_with("..."));
    assert!(wide.chars().count() <= MAX_MEASURED_CHARS + 3);
}

#[test]
fn localized_labels_fall_back_to_english_when_unprintable() {
    let builtin = FontSet::builtin();
    assert_eq!(printable_or(Locale::Ru.updated_at(), Locale::En.updated_at(), &builtin), "Updated");
    assert_eq!(
        printable_or(Locale::Ru.render_failed(), Locale::En.render_failed(), &builtin),
        "Could not draw the bracket"
    );
    assert_eq!(printable_or("Final 🏆", "Cup", &builtin), "Final");
    assert_eq!(printable_or("🏆", "🎯", &builtin), "");
}

#[test]
fn square_crop_keeps_the_center() {
    // Blue bands left and right of a green center square.
    let mut wide = RgbaImage::from_pixel(300, 100, OTHER);
    for y in 0..100 {
        for x in 100..200 {
            wide.put_pixel(x, y, MARKER);
        }
    }
    let crop = square_crop(&DynamicImage::ImageRgba8(wide.clone()), AVATAR_SIZE);
    assert_eq!(crop.dimensions(), (AVATAR_SIZE, AVATAR_SIZE));
    assert!(crop.pixels().all(|p| *p == MARKER));

    let dir = scratch_dir();
    let path = dir.join("wide.png");
    write_png(&path, &wide);
    let loaded = load_square(&path, 64).unwrap();
    assert_eq!(loaded.dimensions(), (64, 64));
    assert_eq!(*loaded.get_pixel(32, 32), MARKER);

    assert!(load_square(&dir.join("missing.png"), 64).is_none());
    std::fs::write(dir.join("broken.png"), b"not an image").unwrap();
    assert!(load_square(&dir.join("broken.png"), 64).is_none());
}

#[test]
fn photos_from_disk_land_on_the_canvas() {
    let dir = scratch_dir();
    let avatar = dir.join("ann.png");
    write_png(&avatar, &RgbaImage::from_pixel(90, 60, MARKER));
    write_png(&dir.join("game1.png"), &RgbaImage::from_pixel(200, 150, OTHER));

    let doc = two_player_doc(json!({"name": "Ann", "photo_url": avatar.to_str().unwrap()}), Some("1"));
    let completed = vec![CompletedGameRecord {
        media_filename: Some("game1.png".to_string()),
        ..CompletedGameRecord::new(&["1"], &["2"]).with_result("2-0", "1")
    }];
    let config = RenderConfig {
        media_dir: dir.clone(),
        ..RenderConfig::default()
    };
    let image = decode(&render_tournament(&doc, &no_participants(), &completed, &config));

    let bracket = build_bracket(&doc, &[], &completed, Locale::En);
    let canvas = CanvasLayout::compose(&bracket, Some(1), config.max_photos);
    assert_eq!(image.dimensions(), (canvas.width, canvas.height));

    let slot = canvas.main.slot(0, 0).unwrap();
    let avatar_x = (slot.left + 8.0).round() as u32;
    let avatar_y = (slot.top() + (CELL_HEIGHT / 2.0 - AVATAR_SIZE as f32) / 2.0).round() as u32;
    let half = AVATAR_SIZE / 2;
    assert_eq!(*image.get_pixel(avatar_x + half, avatar_y + half), MARKER);

    let thumb = canvas.strip.as_ref().unwrap().thumbs[0];
    let center = (THUMB_SIZE / 2.0) as u32;
    let (tx, ty) = (thumb.x.round() as u32, thumb.y.round() as u32);
    assert_eq!(*image.get_pixel(tx + center, ty + center), OTHER);
    assert_eq!(*image.get_pixel(tx + 2, ty + 2), OTHER);
}

#[test]
fn winner_row_is_drawn_differently() {
    let config = RenderConfig::default();
    let open = two_player_doc(json!({"name": "Ann"}), None);
    let decided = two_player_doc(json!({"name": "Ann"}), Some("1"));
    let before = decode(&render_tournament(&open, &no_participants(), &[], &config));
    let after = decode(&render_tournament(&decided, &no_participants(), &[], &config));
    assert_eq!(before.dimensions(), after.dimensions());

    let bracket = build_bracket(&open, &[], &[], Locale::En);
    let canvas = CanvasLayout::compose(&bracket, None, config.max_photos);
    let slot = canvas.main.slot(0, 0).unwrap();
    let name_left = slot.left + 8.0 + AVATAR_SIZE as f32 + 2.0;
    let name_width = slot.left + CELL_WIDTH - 2.0 - name_left;
    let row = CELL_HEIGHT / 2.0 - 2.0;

    let winner_row = |image: &RgbaImage| region(image, name_left, slot.top() + 1.0, name_width, row);
    let loser_row = |image: &RgbaImage| region(image, name_left, slot.center_y + 1.0, name_width, row);
    assert_ne!(winner_row(&before), winner_row(&after));
    assert_eq!(loser_row(&before), loser_row(&after));
}

#[test]
fn panic_while_rendering_degrades() {
    let doc = two_player_doc(json!({"name": "Ann"}), None);
    let result = render_tournament(&doc, &[Exploding], &[], &RenderConfig::default());
    match &result {
        RenderResult::Degraded { reason, summary, .. } => {
            assert!(reason.contains("name lookup exploded"), "{reason}");
            assert_eq!(summary, reason);
        }
        RenderResult::Ok { .. } => panic!("expected a degraded render"),
    }
    let image = image::load_from_memory(result.png()).unwrap();
    assert_eq!((image.width(), image.height()), (900, 240));
}

#[test]
fn feeders_meet_at_their_midpoint() {
    let bracket = placeholder_bracket(&players(4), "Cup");
    let layout = BracketLayout::compute(&bracket, Point::new(10.0, 20.0));

    let a = layout.slot(0, 0).unwrap();
    let b = layout.slot(0, 1).unwrap();
    let child = layout.slot(1, 0).unwrap();
    assert!(a.has_cell && !child.has_cell);
    assert!(b.center_y - a.center_y >= CELL_HEIGHT);
    assert_eq!(child.center_y, (a.center_y + b.center_y) / 2.0);
    assert_eq!(child.left, 10.0 + CELL_WIDTH + ROUND_SPACING);
    assert_eq!(layout.width, CELL_WIDTH + ROUND_SPACING + FINAL_TAIL);

    assert_eq!(layout.connectors.len(), 1);
    assert_eq!(layout.connectors[0].feeders.len(), 2);
    assert_eq!(layout.connectors[0].riser_x, child.left - RISER_OFFSET);

    // Two feeder segments plus the champion's tail.
    assert_eq!(layout.labels.len(), 3);
    let tail = layout.labels.last().unwrap();
    assert_eq!(tail.round, 1);
    assert_eq!(tail.width(), FINAL_TAIL);
}

#[test]
fn deeper_rounds_stay_centered_on_their_feeders() {
    let bracket = placeholder_bracket(&players(16), "Cup");
    let layout = BracketLayout::compute(&bracket, Point::new(0.0, 0.0));
    assert_eq!(layout.rounds.iter().map(Vec::len).collect::<Vec<_>>(), vec![8, 4, 2, 1]);
    for r in 1..layout.rounds.len() {
        for slot in &layout.rounds[r] {
            let top = layout.slot(r - 1, 2 * slot.match_number).unwrap();
            let bottom = layout.slot(r - 1, 2 * slot.match_number + 1).unwrap();
            assert_eq!(slot.center_y, (top.center_y + bottom.center_y) / 2.0);
        }
    }
    let last = layout.slot(3, 0).unwrap();
    assert!(last.center_y > 0.0 && last.center_y < layout.height);
}

#[test]
fn canvas_places_placement_column_and_strip() {
    let mut bracket = placeholder_bracket(&players(4), "Cup");
    let mut third = placeholder_bracket(&players(2), "3rd place match");
    third.placement = Some(tournament_bracket_web::PlacementKey::Third);
    bracket.additional_tournaments.push(third);

    let canvas = CanvasLayout::compose(&bracket, Some(12), 8);
    assert_eq!(canvas.placements.len(), 1);
    assert_eq!(canvas.placements[0].caption.x, MARGIN + canvas.main.width + PLACEMENT_GAP);
    let strip = canvas.strip.as_ref().unwrap();
    assert_eq!(strip.thumbs.len(), 8);
    assert!(strip.top + strip.height <= canvas.height as f32);
    assert!(canvas.width as f32 >= MARGIN + canvas.main.width + PLACEMENT_GAP);

    let empty_strip = CanvasLayout::compose(&bracket, Some(0), 8);
    assert!(empty_strip.strip.as_ref().unwrap().thumbs.is_empty());
    assert!(CanvasLayout::compose(&bracket, None, 8).strip.is_none());
}

#[test]
fn config_reads_lookup_values() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("BRACKET_MEDIA_DIR", "/srv/media"),
        ("BRACKET_FONT", "/a.ttf:/b.ttf"),
        ("BRACKET_LOCALE", "ru_RU"),
        ("BRACKET_MAX_PHOTOS", "20"),
    ]);
    let config = RenderConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
    assert_eq!(config.media_dir, std::path::PathBuf::from("/srv/media"));
    assert_eq!(config.avatar_dir, std::path::PathBuf::from("avatars"));
    assert_eq!(config.font_paths.len(), 2);
    assert_eq!(config.locale, Locale::Ru);
    assert_eq!(config.max_photos, 8);
    assert_eq!(config.media_path("g1.jpg"), std::path::PathBuf::from("/srv/media/g1.jpg"));
    assert_eq!(config.avatar_path("file:///tmp/a.png"), std::path::PathBuf::from("/tmp/a.png"));

    let fallback = RenderConfig::from_lookup(|key| (key == "BRACKET_LOCALE").then(|| "xx".to_string()));
    assert_eq!(fallback, RenderConfig::default());
}

#[test]
fn render_produces_a_png_of_the_layout_size() {
    let doc: TournamentStateDocument = serde_json::from_value(json!({
        "name": "🎯 Friday Open",
        "updated_at": "2026-10-01T18:30:00Z",
        "participants": {
            "1": {"name": "Анна Петрова"}, "2": {"name": "Bob Stone"},
            "3": {"name": "Cid"}, "4": {"name": "Dan 🔥 Ray", "photo_url": "missing.png"},
            "5": {"name": "Eve"}
        },
        "matches": [
            {"round": 0, "match_number": 0, "player1_id": "1", "player2_id": "2", "winner_id": "1", "score": "3-1"},
            {"round": 0, "match_number": 1, "player1_id": "3", "player2_id": "4"},
            {"round": 0, "match_number": 2, "player1_id": "5", "is_bye": true}
        ]
    }))
    .unwrap();
    let completed = vec![CompletedGameRecord {
        media_filename: Some("no-such-photo.jpg".to_string()),
        ..CompletedGameRecord::new(&["3"], &["4"]).with_result("2-0", "4")
    }];
    let config = RenderConfig::default();

    let result = render_tournament(&doc, &no_participants(), &completed, &config);
    assert!(!result.is_degraded(), "{:?}", result.summary());
    assert!(result.summary().starts_with("🎯 Friday Open\n"));

    let image = image::load_from_memory(result.png()).unwrap();
    let bracket = tournament_bracket_web::build_bracket(&doc, &[], &completed, Locale::En);
    let canvas = CanvasLayout::compose(&bracket, Some(1), config.max_photos);
    assert_eq!((image.width(), image.height()), (canvas.width, canvas.height));
}

#[test]
fn oversized_canvas_is_an_error() {
    let bracket = placeholder_bracket(&players(1024), "Huge");
    let scene = Scene {
        bracket: &bracket,
        photos: None,
        updated_at: None,
    };
    assert!(matches!(
        render_scene(&scene, &RenderConfig::default()),
        Err(RenderError::CanvasTooLarge { .. })
    ));

    let doc = TournamentStateDocument::default();
    let result = render_tournament(&doc, &players(1024), &[], &RenderConfig::default());
    assert!(result.is_degraded());
    assert!(image::load_from_memory(result.png()).is_ok());
}

#[test]
fn round_robin_degrades_to_error_image() {
    let doc: TournamentStateDocument = serde_json::from_value(json!({"type": "round-robin"})).unwrap();
    let result = render_tournament(&doc, &no_participants(), &[], &RenderConfig::default());
    assert!(result.is_degraded());
    let image = image::load_from_memory(result.png()).unwrap();
    assert_eq!((image.width(), image.height()), (900, 240));
}

#[test]
fn error_image_is_a_valid_png() {
    let png = error_image("Something went wrong while drawing an extremely long tournament name", Locale::Ru);
    let image = image::load_from_memory(&png).unwrap();
    assert_eq!(image.width(), 900);
}
