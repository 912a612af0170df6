//! Process-wide font cache.
//!
//! Fonts are resolved once, on first use or by an explicit [`init`], and never change
//! afterwards. Resolution walks the configured paths and then a list of common system
//! fonts with Cyrillic coverage; when none can be loaded the 8x8 built-in bitmap font is
//! used, so resolution itself cannot fail.

use crate::config::RenderConfig;
use ab_glyph::{Font, FontArc, PxScale};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Bold.ttf",
    "/usr/share/fonts/noto/NotoSans-Bold.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Characters a candidate must cover to be accepted (Latin, Latin-1, Cyrillic).
const REQUIRED_COVERAGE: &str = "AaZzéЯя";

static FONTS: OnceLock<FontSet> = OnceLock::new();

/// A loaded typeface, or the built-in bitmap font.
#[derive(Clone, Debug)]
pub enum FontFace {
    Vector(FontArc),
    Builtin,
}

fn builtin_glyph(c: char) -> Option<[u8; 8]> {
    BASIC_FONTS.get(c).or_else(|| LATIN_FONTS.get(c))
}

fn builtin_scale(px: f32) -> u32 {
    ((px / 8.0).round() as u32).max(1)
}

impl FontFace {
    /// Whether every non-whitespace character of `text` has a glyph in this face.
    pub fn covers(&self, text: &str) -> bool {
        let mut chars = text.chars().filter(|c| !c.is_whitespace());
        match self {
            FontFace::Vector(font) => chars.all(|c| font.glyph_id(c).0 != 0),
            FontFace::Builtin => chars.all(|c| builtin_glyph(c).is_some()),
        }
    }

    /// Width and height of `text` at `px` pixels.
    pub fn measure(&self, px: f32, text: &str) -> (u32, u32) {
        match self {
            FontFace::Vector(font) => text_size(PxScale::from(px), font, text),
            FontFace::Builtin => {
                let s = builtin_scale(px);
                (text.chars().count() as u32 * 8 * s, 8 * s)
            }
        }
    }

    /// Draw `text` with its top-left corner at (`x`, `y`). Pixels outside the canvas are
    /// skipped.
    pub fn draw(&self, canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, px: f32, text: &str) {
        match self {
            FontFace::Vector(font) => draw_text_mut(canvas, color, x, y, PxScale::from(px), font, text),
            FontFace::Builtin => draw_builtin(canvas, color, x, y, builtin_scale(px), text),
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, FontFace::Builtin)
    }
}

fn draw_builtin(canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, scale: u32, text: &str) {
    let (width, height) = (canvas.width() as i64, canvas.height() as i64);
    let step = 8 * scale as i64;
    for (i, c) in text.chars().enumerate() {
        let glyph = builtin_glyph(c).or_else(|| builtin_glyph('?')).unwrap_or([0; 8]);
        let gx = x as i64 + i as i64 * step;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8 {
                if bits & (1 << col) == 0 {
                    continue;
                }
                for dy in 0..scale as i64 {
                    for dx in 0..scale as i64 {
                        let px = gx + col as i64 * scale as i64 + dx;
                        let py = y as i64 + row as i64 * scale as i64 + dy;
                        if (0..width).contains(&px) && (0..height).contains(&py) {
                            canvas.put_pixel(px as u32, py as u32, color);
                        }
                    }
                }
            }
        }
    }
}

/// Regular and bold faces used for every drawing call.
#[derive(Clone, Debug)]
pub struct FontSet {
    pub regular: FontFace,
    pub bold: FontFace,
    /// No bold face was found; bold text is drawn twice, one pixel apart.
    pub synthetic_bold: bool,
}

impl FontSet {
    /// Resolve faces from `regular`/`bold` first, then the built-in candidate lists.
    pub fn resolve(regular: &[PathBuf], bold: &[PathBuf]) -> Self {
        let defaults = |list: &[&str]| list.iter().map(PathBuf::from).collect::<Vec<_>>();
        let regular_chain: Vec<PathBuf> = regular.iter().cloned().chain(defaults(REGULAR_CANDIDATES)).collect();
        let bold_chain: Vec<PathBuf> = bold.iter().cloned().chain(defaults(BOLD_CANDIDATES)).collect();

        let Some(regular) = first_loadable(&regular_chain) else {
            log::warn!("No usable TrueType font found, using the built-in bitmap font");
            return Self::builtin();
        };
        match first_loadable(&bold_chain) {
            Some(bold) => Self {
                regular: FontFace::Vector(regular),
                bold: FontFace::Vector(bold),
                synthetic_bold: false,
            },
            None => Self {
                bold: FontFace::Vector(regular.clone()),
                regular: FontFace::Vector(regular),
                synthetic_bold: true,
            },
        }
    }

    /// Built-in bitmap font only.
    pub fn builtin() -> Self {
        Self {
            regular: FontFace::Builtin,
            bold: FontFace::Builtin,
            synthetic_bold: true,
        }
    }

    pub fn face(&self, bold: bool) -> &FontFace {
        if bold {
            &self.bold
        } else {
            &self.regular
        }
    }

    pub fn draw(&self, canvas: &mut RgbaImage, style: TextStyle, x: i32, y: i32, text: &str) {
        let face = self.face(style.bold);
        face.draw(canvas, style.color, x, y, style.px, text);
        if style.bold && self.synthetic_bold {
            face.draw(canvas, style.color, x + 1, y, style.px, text);
        }
    }

    pub fn measure(&self, style: TextStyle, text: &str) -> (u32, u32) {
        let (w, h) = self.face(style.bold).measure(style.px, text);
        let extra = u32::from(style.bold && self.synthetic_bold);
        (w + extra, h)
    }
}

/// Size, weight and color of a piece of text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub px: f32,
    pub bold: bool,
    pub color: Rgba<u8>,
}

impl TextStyle {
    pub fn new(px: f32, color: Rgba<u8>) -> Self {
        Self { px, bold: false, color }
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn sized(mut self, px: f32) -> Self {
        self.px = px;
        self
    }
}

fn load(path: &Path) -> Option<FontArc> {
    let bytes = std::fs::read(path).ok()?;
    match FontArc::try_from_vec(bytes) {
        Ok(font) => {
            if REQUIRED_COVERAGE.chars().all(|c| font.glyph_id(c).0 != 0) {
                Some(font)
            } else {
                log::debug!("Font {} lacks Cyrillic/Latin coverage, skipping", path.display());
                None
            }
        }
        Err(e) => {
            log::debug!("Font {} could not be parsed: {}", path.display(), e);
            None
        }
    }
}

fn first_loadable(chain: &[PathBuf]) -> Option<FontArc> {
    chain.iter().find_map(|path| {
        let font = load(path)?;
        log::debug!("Using font {}", path.display());
        Some(font)
    })
}

/// Resolve fonts with `config`'s paths. Only the first call (of `init` or [`get`]) decides.
pub fn init(config: &RenderConfig) -> &'static FontSet {
    FONTS.get_or_init(|| FontSet::resolve(&config.font_paths, &config.bold_font_paths))
}

/// Fonts in use, resolved with the default candidates when [`init`] was never called.
pub fn get() -> &'static FontSet {
    FONTS.get_or_init(|| FontSet::resolve(&[], &[]))
}
