//! Sprite attribute table decoding and multi-tile sprite assembly.
//!
//! Each 8-byte entry is read as little-endian words:
//!
//! ```text
//! word0: LLLL SS-Y YYYY YYYY   link, size class, y
//! word1: PCCV HTTT TTTT TTT-   priority, palette line, flips, tile
//! word2: ---- ---X XXXX XXXX   x
//! ```
//!
//! Size classes map to a tile grid (w x h): 0 -> 1x1, 1 -> 1x2, 2 -> 2x2,
//! 3 -> 3x4. Positions are hardware coordinates with the visible area
//! starting at 128.

use ir_core::error::{DecodeError, DecodeResult};
use ir_core::ir::{Palette, Sprite};
use ir_core::logging::{log, LogCategory, LogLevel};
use ir_core::ppu::tile::{MegaDrive4BppDecoder, TileDecoder, TILE_DIM};
use ir_core::ppu::IndexedPalette;
use ir_core::types::Image;

pub const SAT_ENTRY_BYTES: usize = 8;
pub const MAX_SPRITES: usize = 80;
/// Bytes the table occupies in VRAM.
pub const SAT_SIZE: usize = MAX_SPRITES * SAT_ENTRY_BYTES;
/// Hardware coordinate of the first visible pixel on each axis.
pub const SCREEN_ORIGIN: i32 = 128;

const TILE_BYTES: usize = 32;
const TILE_INDEX_MASK: u16 = 0x07FF;

/// Tile grid (columns, rows) for a size class.
pub fn size_class_grid(size_class: u8) -> (u32, u32) {
    match size_class & 0x03 {
        0 => (1, 1),
        1 => (1, 2),
        2 => (2, 2),
        _ => (3, 4),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteEntry {
    pub index: usize,
    pub y: u16,
    pub size_class: u8,
    /// Next entry in the hardware chain; kept as metadata only.
    pub link: u8,
    pub tile_index: u16,
    pub flip_h: bool,
    pub flip_v: bool,
    pub palette: u8,
    pub priority: bool,
    pub x: u16,
}

impl SpriteEntry {
    pub fn parse(index: usize, bytes: &[u8]) -> Self {
        let word = |i: usize| u16::from_le_bytes([bytes[i * 2], bytes[i * 2 + 1]]);
        let w0 = word(0);
        let w1 = word(1);
        let w2 = word(2);
        Self {
            index,
            y: w0 & 0x01FF,
            size_class: ((w0 >> 10) & 0x03) as u8,
            link: ((w0 >> 12) & 0x0F) as u8,
            tile_index: (w1 >> 1) & TILE_INDEX_MASK,
            flip_h: w1 & 0x0800 != 0,
            flip_v: w1 & 0x1000 != 0,
            palette: ((w1 >> 13) & 0x03) as u8,
            priority: w1 & 0x8000 != 0,
            x: w2 & 0x01FF,
        }
    }

    /// Entries parked at y 0, beyond the 480-line range, or on tile 0 are inactive.
    pub fn is_active(&self) -> bool {
        self.y != 0 && self.y < 480 && self.tile_index != 0
    }

    pub fn grid(&self) -> (u32, u32) {
        size_class_grid(self.size_class)
    }
}

/// Parse up to 80 entries; a trailing partial entry is ignored.
pub fn parse_table(sprite_table: &[u8]) -> Vec<SpriteEntry> {
    sprite_table
        .chunks_exact(SAT_ENTRY_BYTES)
        .take(MAX_SPRITES)
        .enumerate()
        .map(|(i, bytes)| SpriteEntry::parse(i, bytes))
        .collect()
}

/// Assemble every active entry into a positioned RGBA sprite, in table order.
///
/// The grid is walked in raster order; grid cell `n` uses pattern tile
/// `base + n` (wrapping at 2048). Flips mirror both the tile placement and
/// the pixels inside each tile.
pub fn decode(
    sprite_table: &[u8],
    pattern_ram: &[u8],
    palettes: &[Palette],
) -> DecodeResult<Vec<Sprite>> {
    let resolved: Vec<_> = palettes.iter().map(Palette::resolve).collect();
    let entries = parse_table(sprite_table);
    let mut sprites = Vec::new();

    for entry in entries.iter().filter(|e| e.is_active()) {
        let palette = resolved
            .get(entry.palette as usize)
            .ok_or(DecodeError::OutOfRange {
                what: "sprite palette",
                index: entry.palette as usize,
                limit: resolved.len(),
            })?;
        let image = assemble(entry, pattern_ram, palette)?;
        if image.is_empty() {
            continue;
        }
        sprites.push(Sprite {
            id: entry.index,
            x: entry.x as i32 - SCREEN_ORIGIN,
            y: entry.y as i32 - SCREEN_ORIGIN,
            width: image.width,
            height: image.height,
            image,
            priority: Some(entry.priority),
            palette_index: Some(entry.palette),
        });
    }

    log(LogCategory::Sprites, LogLevel::Debug, || {
        format!(
            "{} of {} sprite entries active",
            sprites.len(),
            entries.len()
        )
    });
    Ok(sprites)
}

fn assemble(
    entry: &SpriteEntry,
    pattern_ram: &[u8],
    palette: &dyn IndexedPalette,
) -> DecodeResult<Image> {
    let (cols, rows) = entry.grid();
    let mut image = Image::new(cols * TILE_DIM, rows * TILE_DIM);
    let decoder = MegaDrive4BppDecoder;

    let mut counter = 0u16;
    for ty in 0..rows {
        for tx in 0..cols {
            let tile = entry.tile_index.wrapping_add(counter) & TILE_INDEX_MASK;
            counter += 1;
            let start = tile as usize * TILE_BYTES;
            let data = pattern_ram
                .get(start..start + TILE_BYTES)
                .ok_or(DecodeError::OutOfRange {
                    what: "sprite pattern tile",
                    index: tile as usize,
                    limit: pattern_ram.len() / TILE_BYTES,
                })?;

            let dest_tx = if entry.flip_h { cols - 1 - tx } else { tx };
            let dest_ty = if entry.flip_v { rows - 1 - ty } else { ty };
            for py in 0..TILE_DIM {
                for px in 0..TILE_DIM {
                    let sx = if entry.flip_h { TILE_DIM - 1 - px } else { px };
                    let sy = if entry.flip_v { TILE_DIM - 1 - py } else { py };
                    let index = decoder.decode_pixel(data, sx as u8, sy as u8);
                    if let Some(color) = palette.color(index) {
                        image.put(
                            (dest_tx * TILE_DIM + px) as i32,
                            (dest_ty * TILE_DIM + py) as i32,
                            color,
                        );
                    }
                }
            }
        }
    }
    Ok(image)
}
