//! Render configuration read from the environment.
//!
//! | Variable             | Default  |
//! |----------------------|----------|
//! | `BRACKET_MEDIA_DIR`  | `media`  |
//! | `BRACKET_AVATAR_DIR` | `avatars`|
//! | `BRACKET_FONT`       | (none)   |
//! | `BRACKET_FONT_BOLD`  | (none)   |
//! | `BRACKET_LOCALE`     | `en`     |
//! | `BRACKET_MAX_PHOTOS` | `8`      |

use crate::locale::Locale;
use std::path::{Path, PathBuf};

/// Thumbnails shown in the bottom photo strip at most.
pub const MAX_STRIP_PHOTOS: usize = 8;

#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Directory holding completed-game media (`media_filename` is relative to it).
    pub media_dir: PathBuf,
    /// Directory relative avatar `photo_url`s are resolved against.
    pub avatar_dir: PathBuf,
    /// Fonts tried before the built-in candidates.
    pub font_paths: Vec<PathBuf>,
    pub bold_font_paths: Vec<PathBuf>,
    pub locale: Locale,
    pub max_photos: usize,
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("media")
}

fn default_avatar_dir() -> PathBuf {
    PathBuf::from("avatars")
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            media_dir: default_media_dir(),
            avatar_dir: default_avatar_dir(),
            font_paths: Vec::new(),
            bold_font_paths: Vec::new(),
            locale: Locale::default(),
            max_photos: MAX_STRIP_PHOTOS,
        }
    }
}

impl RenderConfig {
    /// Read the `BRACKET_*` variables; anything unset or unparsable keeps its default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RenderConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let locale = match non_empty("BRACKET_LOCALE") {
            Some(raw) => Locale::parse(&raw).unwrap_or_else(|| {
                log::warn!("Unknown BRACKET_LOCALE {:?}, using {:?}", raw, defaults.locale);
                defaults.locale
            }),
            None => defaults.locale,
        };
        Self {
            media_dir: non_empty("BRACKET_MEDIA_DIR").map(PathBuf::from).unwrap_or(defaults.media_dir),
            avatar_dir: non_empty("BRACKET_AVATAR_DIR").map(PathBuf::from).unwrap_or(defaults.avatar_dir),
            font_paths: non_empty("BRACKET_FONT").map(|v| split_paths(&v)).unwrap_or_default(),
            bold_font_paths: non_empty("BRACKET_FONT_BOLD").map(|v| split_paths(&v)).unwrap_or_default(),
            locale,
            max_photos: non_empty("BRACKET_MAX_PHOTOS")
                .and_then(|v| v.trim().parse::<usize>().ok())
                .map(|n| n.min(MAX_STRIP_PHOTOS))
                .unwrap_or(defaults.max_photos),
        }
    }

    /// Location of an avatar reference: absolute paths as given, the rest under `avatar_dir`.
    pub fn avatar_path(&self, photo_url: &str) -> PathBuf {
        resolve(&self.avatar_dir, photo_url)
    }

    pub fn media_path(&self, media_filename: &str) -> PathBuf {
        resolve(&self.media_dir, media_filename)
    }
}

fn resolve(base: &Path, reference: &str) -> PathBuf {
    let reference = reference.strip_prefix("file://").unwrap_or(reference);
    let path = Path::new(reference);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Font variables accept several paths separated by `:` (or `;`).
fn split_paths(value: &str) -> Vec<PathBuf> {
    value
        .split([':', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}
