//! Avatar and thumbnail images. Loading is best effort: any failure yields None and the
//! caller draws a placeholder for that item only.

use crate::models::Player;
use crate::render::fonts::{FontSet, TextStyle};
use crate::render::text::initials;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use std::path::Path;

const PALETTE: [Rgba<u8>; 8] = [
    Rgba([0x4e, 0x79, 0xa7, 0xff]),
    Rgba([0xf2, 0x8e, 0x2b, 0xff]),
    Rgba([0xe1, 0x57, 0x59, 0xff]),
    Rgba([0x76, 0xb7, 0xb2, 0xff]),
    Rgba([0x59, 0xa1, 0x4f, 0xff]),
    Rgba([0xed, 0xc9, 0x48, 0xff]),
    Rgba([0xb0, 0x7a, 0xa1, 0xff]),
    Rgba([0x9c, 0x75, 0x5f, 0xff]),
];

/// Center square crop of `image`, scaled to `size` x `size`.
pub fn square_crop(image: &DynamicImage, size: u32) -> RgbaImage {
    let (w, h) = (image.width(), image.height());
    let side = w.min(h).max(1);
    let cropped = image.crop_imm((w - side.min(w)) / 2, (h - side.min(h)) / 2, side, side);
    imageops::resize(&cropped.to_rgba8(), size, size, FilterType::Triangle)
}

/// Load the image at `path` as a square of `size` pixels.
pub fn load_square(path: &Path, size: u32) -> Option<RgbaImage> {
    if !path.is_file() {
        return None;
    }
    match image::open(path) {
        Ok(image) => Some(square_crop(&image, size)),
        Err(e) => {
            log::debug!("Could not load image {}: {}", path.display(), e);
            None
        }
    }
}

/// Stable color for a player id.
pub fn avatar_color(id: &str) -> Rgba<u8> {
    let hash = id.bytes().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
    PALETTE[hash as usize % PALETTE.len()]
}

/// Solid square in the player's color with their initials centered on it.
pub fn placeholder_avatar(player: &Player, size: u32, fonts: &FontSet) -> RgbaImage {
    let mut avatar = RgbaImage::from_pixel(size, size, avatar_color(&player.id));
    let mut letters = initials(player);
    if !fonts.regular.covers(&letters) {
        letters = letters.chars().filter(char::is_ascii_alphanumeric).collect();
    }
    let style = TextStyle::new(size as f32 * 0.45, Rgba([0xff, 0xff, 0xff, 0xff])).bold(true);
    let (w, h) = fonts.measure(style, &letters);
    let x = (size as i32 - w as i32) / 2;
    let y = (size as i32 - h as i32) / 2;
    fonts.draw(&mut avatar, style, x, y, &letters);
    avatar
}

/// Photo avatar when `photo` resolves to a readable image, the placeholder otherwise.
pub fn avatar_for(player: &Player, photo: Option<&Path>, size: u32, fonts: &FontSet) -> RgbaImage {
    photo
        .and_then(|path| load_square(path, size))
        .unwrap_or_else(|| placeholder_avatar(player, size, fonts))
}
