//! Rendering: paints a laid out bracket onto an RGBA canvas and encodes it as PNG.

pub mod avatar;
pub mod fonts;
pub mod layout;
pub mod text;

use crate::config::RenderConfig;
use crate::locale::Locale;
use crate::models::{Match, Player, TournamentBracket};
use chrono::{DateTime, Utc};
use fonts::{FontSet, TextStyle};
use image::{imageops, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use layout::{BracketLayout, CanvasLayout, PhotoStrip, SlotPosition, AVATAR_SIZE, CELL_HEIGHT, CELL_WIDTH};
use std::io::Cursor;
use std::path::PathBuf;

/// Largest canvas side we are willing to allocate.
pub const MAX_CANVAS_SIDE: u32 = 16_000;

const BACKGROUND: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);
const CELL_FILL: Rgba<u8> = Rgba([0xf4, 0xf6, 0xf8, 0xff]);
const CELL_BORDER: Rgba<u8> = Rgba([0xc8, 0xcd, 0xd3, 0xff]);
const LINE: Rgba<u8> = Rgba([0x5f, 0x6b, 0x7a, 0xff]);
const TEXT: Rgba<u8> = Rgba([0x1d, 0x23, 0x2b, 0xff]);
const MUTED: Rgba<u8> = Rgba([0x7a, 0x84, 0x90, 0xff]);
const ACCENT: Rgba<u8> = Rgba([0x1e, 0x6f, 0xd9, 0xff]);
const THUMB_PLACEHOLDER: Rgba<u8> = Rgba([0xdd, 0xe1, 0xe6, 0xff]);

const TITLE_PX: f32 = 34.0;
const SUBTITLE_PX: f32 = 16.0;
const NAME_PX: f32 = 18.0;
const LABEL_PX: f32 = 15.0;
const LABEL_MIN_PX: f32 = 11.0;
const CAPTION_PX: f32 = 20.0;
const LINE_WIDTH: u32 = 2;

/// Errors that stop a bracket image from being produced.
#[derive(Debug)]
pub enum RenderError {
    /// The computed canvas exceeds [`MAX_CANVAS_SIDE`].
    CanvasTooLarge { width: u32, height: u32 },
    Encode(image::ImageError),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::CanvasTooLarge { width, height } => {
                write!(f, "Bracket image would be too large ({}x{})", width, height)
            }
            RenderError::Encode(e) => write!(f, "Could not encode PNG: {}", e),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Encode(e) => Some(e),
            RenderError::CanvasTooLarge { .. } => None,
        }
    }
}

impl From<image::ImageError> for RenderError {
    fn from(e: image::ImageError) -> Self {
        RenderError::Encode(e)
    }
}

/// What gets drawn: the bracket, completed-game photos and the last update time.
#[derive(Clone, Debug)]
pub struct Scene<'a> {
    pub bracket: &'a TournamentBracket,
    /// None hides the photo strip; an empty list shows its placeholder caption.
    pub photos: Option<Vec<PathBuf>>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

fn fill(canvas: &mut RgbaImage, x: f32, y: f32, w: f32, h: f32, color: Rgba<u8>) {
    let (w, h) = (w.round() as i64, h.round() as i64);
    if w <= 0 || h <= 0 {
        return;
    }
    let rect = Rect::at(x.round() as i32, y.round() as i32).of_size(w as u32, h as u32);
    draw_filled_rect_mut(canvas, rect, color);
}

fn hline(canvas: &mut RgbaImage, x0: f32, x1: f32, y: f32) {
    let (a, b) = (x0.min(x1), x0.max(x1));
    let half = LINE_WIDTH as f32 / 2.0;
    fill(canvas, a, y - half, b - a + half, LINE_WIDTH as f32, LINE);
}

fn vline(canvas: &mut RgbaImage, x: f32, y0: f32, y1: f32) {
    let (a, b) = (y0.min(y1), y0.max(y1));
    let half = LINE_WIDTH as f32 / 2.0;
    fill(canvas, x - half, a - half, LINE_WIDTH as f32, b - a + LINE_WIDTH as f32, LINE);
}

/// `text` without pictographs; ASCII only when the font still cannot draw it.
pub fn printable_text(text: &str, fonts: &FontSet) -> String {
    let cleaned = text::strip_pictographs(text);
    if fonts.bold.covers(&cleaned) && fonts.regular.covers(&cleaned) {
        cleaned
    } else {
        text::ascii_fallback(&cleaned)
    }
}

/// Printable `text`, or printable `fallback` when nothing of `text` survives.
pub fn printable_or(text: &str, fallback: &str, fonts: &FontSet) -> String {
    let printable = printable_text(text, fonts);
    if printable.is_empty() {
        printable_text(fallback, fonts)
    } else {
        printable
    }
}

/// Printable title, or the default tournament name when nothing printable is left.
pub fn printable_title(name: &str, fonts: &FontSet, locale: Locale) -> String {
    let title = printable_or(name, locale.default_tournament_name(), fonts);
    if title.is_empty() {
        Locale::En.default_tournament_name().to_string()
    } else {
        title
    }
}

/// Text fitted to `max_width`: shrink down to the minimum size, then truncate.
fn fit(fonts: &FontSet, style: TextStyle, min_px: f32, text: &str, max_width: f32) -> (TextStyle, String) {
    let max_width = max_width.max(0.0) as u32;
    let mut style = style;
    while fonts.measure(style, text).0 > max_width && style.px > min_px {
        style = style.sized((style.px - 1.0).max(min_px));
    }
    let fitted = text::truncate_to_width(text, max_width, |t| fonts.measure(style, t).0);
    (style, fitted)
}

fn draw_centered(canvas: &mut RgbaImage, fonts: &FontSet, style: TextStyle, center_x: f32, top: f32, text: &str) {
    let (w, _) = fonts.measure(style, text);
    fonts.draw(canvas, style, (center_x - w as f32 / 2.0).round() as i32, top.round() as i32, text);
}

struct Painter<'a> {
    canvas: RgbaImage,
    fonts: &'a FontSet,
    config: &'a RenderConfig,
}

impl Painter<'_> {
    fn draw_title(&mut self, layout: &CanvasLayout, name: &str, updated_at: Option<DateTime<Utc>>) {
        let title = printable_title(name, self.fonts, self.config.locale);
        let max_width = layout.width as f32 - 2.0 * layout::MARGIN;
        let (style, title) = fit(self.fonts, TextStyle::new(TITLE_PX, TEXT).bold(true), 18.0, &title, max_width);
        draw_centered(&mut self.canvas, self.fonts, style, layout.title.x, layout.title.y, &title);
        if let Some(at) = updated_at {
            let label = printable_or(self.config.locale.updated_at(), Locale::En.updated_at(), self.fonts);
            let line = format!("{} {}", label, at.format("%d.%m.%Y %H:%M UTC"));
            let (_, h) = self.fonts.measure(style, &title);
            let top = layout.title.y + h as f32 + 8.0;
            draw_centered(&mut self.canvas, self.fonts, TextStyle::new(SUBTITLE_PX, MUTED), layout.title.x, top, &line);
        }
    }

    fn draw_connectors(&mut self, layout: &BracketLayout) {
        for connector in &layout.connectors {
            let mut top = connector.child.y;
            let mut bottom = connector.child.y;
            for feeder in &connector.feeders {
                hline(&mut self.canvas, feeder.x, connector.riser_x, feeder.y);
                top = top.min(feeder.y);
                bottom = bottom.max(feeder.y);
            }
            vline(&mut self.canvas, connector.riser_x, top, bottom);
            hline(&mut self.canvas, connector.riser_x, connector.child.x, connector.child.y);
        }
        if let Some(tail) = layout.labels.last().filter(|l| l.round + 1 == layout.rounds.len()) {
            hline(&mut self.canvas, tail.start.x, tail.end.x, tail.start.y);
        }
    }

    fn draw_player_row(&mut self, slot: &SlotPosition, m: &Match, player: &Player, row_top: f32) {
        let row_height = CELL_HEIGHT / 2.0;
        let photo = player.photo_url.as_deref().map(|url| self.config.avatar_path(url));
        let avatar = avatar::avatar_for(player, photo.as_deref(), AVATAR_SIZE, self.fonts);
        let avatar_x = slot.left + 8.0;
        let avatar_y = row_top + (row_height - AVATAR_SIZE as f32) / 2.0;
        imageops::overlay(&mut self.canvas, &avatar, avatar_x.round() as i64, avatar_y.round() as i64);

        let name_x = avatar_x + AVATAR_SIZE as f32 + 10.0;
        let style = TextStyle::new(NAME_PX, TEXT).bold(m.is_winner(player));
        let name = printable_text(&player.name, self.fonts);
        let (style, name) = fit(self.fonts, style, 12.0, &name, slot.left + CELL_WIDTH - 8.0 - name_x);
        let (_, h) = self.fonts.measure(style, &name);
        let name_y = row_top + (row_height - h as f32) / 2.0;
        self.fonts.draw(&mut self.canvas, style, name_x.round() as i32, name_y.round() as i32, &name);
    }

    fn draw_cell(&mut self, slot: &SlotPosition, m: &Match) {
        let top = slot.top();
        fill(&mut self.canvas, slot.left, top, CELL_WIDTH, CELL_HEIGHT, CELL_FILL);
        let border = Rect::at(slot.left.round() as i32, top.round() as i32)
            .of_size(CELL_WIDTH as u32, CELL_HEIGHT as u32);
        draw_hollow_rect_mut(&mut self.canvas, border, CELL_BORDER);
        fill(&mut self.canvas, slot.left, slot.center_y, CELL_WIDTH, 1.0, CELL_BORDER);
        if let Some(p) = &m.player1 {
            self.draw_player_row(slot, m, p, top);
        }
        if let Some(p) = &m.player2 {
            self.draw_player_row(slot, m, p, slot.center_y);
        }
    }

    fn draw_labels(&mut self, layout: &BracketLayout, bracket: &TournamentBracket) {
        for label in &layout.labels {
            let Some(m) = bracket.rounds.get(label.round).and_then(|r| r.get(label.match_number)) else {
                continue;
            };
            let Some(winner) = m.advancing_player() else {
                continue;
            };
            let mut text = text::short_name(&printable_text(&winner.name, self.fonts));
            if let Some(score) = m.score.as_deref().filter(|_| m.has_score()) {
                text = format!("{} {}", text, score.trim());
            }
            let color = if label.round + 1 == layout.rounds.len() { ACCENT } else { TEXT };
            let style = TextStyle::new(LABEL_PX, color).bold(true);
            let (style, text) = fit(self.fonts, style, LABEL_MIN_PX, &text, label.width() - 6.0);
            let (_, h) = self.fonts.measure(style, &text);
            let center_x = (label.start.x + label.end.x) / 2.0;
            draw_centered(&mut self.canvas, self.fonts, style, center_x, label.start.y - h as f32 - 5.0, &text);
        }
    }

    fn draw_bracket(&mut self, layout: &BracketLayout, bracket: &TournamentBracket) {
        self.draw_connectors(layout);
        if let (Some(slots), Some(matches)) = (layout.rounds.first(), bracket.rounds.first()) {
            for (slot, m) in slots.iter().zip(matches) {
                self.draw_cell(slot, m);
            }
        }
        self.draw_labels(layout, bracket);
    }

    fn draw_strip(&mut self, strip: &PhotoStrip, photos: &[PathBuf]) {
        let width = self.canvas.width() as f32;
        fill(&mut self.canvas, 0.0, strip.top, width, 1.0, CELL_BORDER);
        if strip.thumbs.is_empty() {
            let style = TextStyle::new(CAPTION_PX, MUTED);
            let caption = printable_or(self.config.locale.no_photos(), Locale::En.no_photos(), self.fonts);
            let (_, h) = self.fonts.measure(style, &caption);
            draw_centered(&mut self.canvas, self.fonts, style, strip.caption.x, strip.caption.y - h as f32 / 2.0, &caption);
            return;
        }
        let size = layout::THUMB_SIZE as u32;
        for (corner, path) in strip.thumbs.iter().zip(photos) {
            match avatar::load_square(path, size) {
                Some(thumb) => imageops::overlay(&mut self.canvas, &thumb, corner.x.round() as i64, corner.y.round() as i64),
                None => fill(&mut self.canvas, corner.x, corner.y, size as f32, size as f32, THUMB_PLACEHOLDER),
            }
        }
    }
}

/// Draw `scene` and encode it as PNG.
pub fn render_scene(scene: &Scene<'_>, config: &RenderConfig) -> Result<Vec<u8>, RenderError> {
    let fonts = fonts::init(config);
    let photos = scene.photos.as_deref();
    let layout = CanvasLayout::compose(scene.bracket, photos.map(<[PathBuf]>::len), config.max_photos);
    if layout.width > MAX_CANVAS_SIDE || layout.height > MAX_CANVAS_SIDE {
        return Err(RenderError::CanvasTooLarge {
            width: layout.width,
            height: layout.height,
        });
    }

    let mut painter = Painter {
        canvas: RgbaImage::from_pixel(layout.width, layout.height, BACKGROUND),
        fonts,
        config,
    };
    painter.draw_title(&layout, &scene.bracket.name, scene.updated_at);
    painter.draw_bracket(&layout.main, scene.bracket);
    for placed in &layout.placements {
        let Some(sub) = scene.bracket.additional_tournaments.get(placed.index) else {
            continue;
        };
        let (style, caption) = fit(
            fonts,
            TextStyle::new(CAPTION_PX, TEXT).bold(true),
            14.0,
            &printable_title(&sub.name, fonts, config.locale),
            placed.layout.width,
        );
        fonts.draw(&mut painter.canvas, style, placed.caption.x.round() as i32, placed.caption.y.round() as i32, &caption);
        painter.draw_bracket(&placed.layout, sub);
    }
    if let Some(strip) = &layout.strip {
        painter.draw_strip(strip, photos.unwrap_or_default());
    }
    encode_png(&painter.canvas)
}

/// Plain-text image reporting why the bracket could not be drawn.
pub fn error_image(message: &str, locale: Locale) -> Vec<u8> {
    let fonts = fonts::get();
    let mut canvas = RgbaImage::from_pixel(900, 240, BACKGROUND);
    let heading = TextStyle::new(26.0, TEXT).bold(true);
    let heading_text = printable_or(locale.render_failed(), Locale::En.render_failed(), fonts);
    fonts.draw(&mut canvas, heading, 32, 32, &heading_text);

    let body = TextStyle::new(16.0, MUTED);
    let mut y = 84;
    for line in wrap(message, 90).into_iter().take(6) {
        let line = printable_text(&line, fonts);
        fonts.draw(&mut canvas, body, 32, y, &line);
        y += 22;
    }
    encode_png(&canvas).unwrap_or_else(|e| {
        log::error!("Could not encode error image: {}", e);
        Vec::new()
    })
}

fn wrap(message: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in message.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
