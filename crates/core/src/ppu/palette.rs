//! Indexed palettes for tile-based video hardware.
//!
//! Pixel values in tiles are indices; the color is looked up at draw time in
//! a palette chosen per tilemap cell or per sprite. Index 0 is transparent on
//! every system handled here.
//!
//! - Mega Drive: 4 palettes of 16 colors, 3 bits per channel
//! - SNES: 16 palettes of 16 colors, 5 bits per channel (BGR555)
//! - NES: 32-byte palette RAM indexing a fixed master palette
//! - Game Boy Color: 8 + 8 palettes of 4 colors (BGR555)

use crate::types::Rgba;

/// Colors per palette on 4-bit-per-pixel systems.
pub const PALETTE_SIZE: usize = 16;

/// Expand an `bits`-wide channel value to 8 bits, rounding to nearest.
#[inline]
pub fn expand_channel(value: u8, bits: u32) -> u8 {
    let max = (1u32 << bits) - 1;
    let v = (value as u32).min(max);
    ((v * 255 + max / 2) / max) as u8
}

/// Format an RGB triple as `#RRGGBB`.
pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

/// Parse `#RRGGBB` (leading `#` optional) into an opaque RGBA color.
pub fn parse_hex(hex: &str) -> Option<Rgba> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?, 0xFF])
}

/// Decode a little-endian BGR555 word (`0BBBBBGG GGGRRRRR`) to 8-bit RGB.
pub fn bgr555_to_rgb(word: u16) -> [u8; 3] {
    let r = (word & 0x1F) as u8;
    let g = ((word >> 5) & 0x1F) as u8;
    let b = ((word >> 10) & 0x1F) as u8;
    [expand_channel(r, 5), expand_channel(g, 5), expand_channel(b, 5)]
}

/// Read-only view of an indexed palette.
pub trait IndexedPalette {
    /// Color for a pixel index. Index 0 and unknown indices yield `None`.
    fn color(&self, index: u8) -> Option<Rgba>;

    /// Get the number of colors in this palette.
    fn len(&self) -> usize;

    /// Check if the palette is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A palette with its colors already parsed, used on the draw path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPalette {
    colors: [Option<Rgba>; PALETTE_SIZE],
}

impl ResolvedPalette {
    pub fn from_colors(colors: [Option<Rgba>; PALETTE_SIZE]) -> Self {
        Self { colors }
    }

    /// Sixteen-step gray ramp, used for tile previews when no real palette applies.
    pub fn grayscale() -> Self {
        let mut colors = [None; PALETTE_SIZE];
        for (i, slot) in colors.iter_mut().enumerate() {
            let v = expand_channel(i as u8, 4);
            *slot = Some([v, v, v, 0xFF]);
        }
        Self { colors }
    }
}

impl IndexedPalette for ResolvedPalette {
    fn color(&self, index: u8) -> Option<Rgba> {
        if index == 0 {
            return None;
        }
        self.colors.get(index as usize).copied().flatten()
    }

    fn len(&self) -> usize {
        PALETTE_SIZE
    }
}
