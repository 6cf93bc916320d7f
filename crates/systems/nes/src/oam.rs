//! OAM sprite decoding.
//!
//! 64 entries of 4 bytes: y, tile, attributes, x. Attribute bits 0-1 select
//! the sprite palette, bit 5 puts the sprite behind the background, bits 6
//! and 7 flip horizontally and vertically.

use ir_core::error::{DecodeError, DecodeResult};
use ir_core::ir::{Palette, Sprite};
use ir_core::logging::{log, LogCategory, LogLevel};
use ir_core::ppu::tile::{blit_indices, decode_indices, Nes2BppDecoder, TILE_DIM};
use ir_core::ppu::IndexedPalette;
use ir_core::types::Image;

pub const OAM_SIZE: usize = 256;
pub const OAM_ENTRIES: usize = 64;
const TILE_BYTES: usize = 16;
/// Entries at or below this y never reach the visible lines.
const HIDDEN_Y: u8 = 0xEF;

/// PPUCTRL bits that shape sprites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpriteControl {
    pub tall: bool,
    /// Pattern table for 8x8 sprites (0x0000 or 0x1000).
    pub table: usize,
}

impl SpriteControl {
    pub fn from_ppuctrl(ctrl: u8) -> Self {
        Self {
            tall: ctrl & 0x20 != 0,
            table: if ctrl & 0x08 != 0 { 0x1000 } else { 0x0000 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OamEntry {
    pub index: usize,
    pub y: u8,
    pub tile: u8,
    pub palette: u8,
    pub behind_background: bool,
    pub flip_h: bool,
    pub flip_v: bool,
    pub x: u8,
}

impl OamEntry {
    pub fn parse(index: usize, bytes: &[u8]) -> Self {
        let attr = bytes[2];
        Self {
            index,
            y: bytes[0],
            tile: bytes[1],
            palette: attr & 0x03,
            behind_background: attr & 0x20 != 0,
            flip_h: attr & 0x40 != 0,
            flip_v: attr & 0x80 != 0,
            x: bytes[3],
        }
    }

    /// Pattern address of each 8x8 half, top first.
    fn tile_addresses(&self, control: SpriteControl) -> Vec<usize> {
        if control.tall {
            let table = (self.tile as usize & 1) * 0x1000;
            let top = (self.tile & 0xFE) as usize;
            vec![table + top * TILE_BYTES, table + (top + 1) * TILE_BYTES]
        } else {
            vec![control.table + self.tile as usize * TILE_BYTES]
        }
    }
}

/// Assemble every visible entry, in OAM order.
///
/// `obj` is the 16-entry sprite palette; a pixel of index `i` in a sprite
/// with palette `p` takes entry `4 * p + i`.
pub fn decode(
    oam: &[u8],
    chr: &[u8],
    obj: &Palette,
    control: SpriteControl,
) -> DecodeResult<Vec<Sprite>> {
    if oam.len() < OAM_SIZE {
        return Err(DecodeError::min_size("OAM", OAM_SIZE, oam.len()));
    }
    let palette = obj.resolve();
    let mut sprites = Vec::new();

    for (index, bytes) in oam.chunks_exact(4).take(OAM_ENTRIES).enumerate() {
        let entry = OamEntry::parse(index, bytes);
        if entry.y >= HIDDEN_Y {
            continue;
        }
        let halves = entry.tile_addresses(control);
        let mut image = Image::new(TILE_DIM, TILE_DIM * halves.len() as u32);
        for (half, &addr) in halves.iter().enumerate() {
            let data = chr
                .get(addr..addr + TILE_BYTES)
                .ok_or(DecodeError::OutOfRange {
                    what: "sprite pattern tile",
                    index: addr / TILE_BYTES,
                    limit: chr.len() / TILE_BYTES,
                })?;
            let indices = decode_indices(&Nes2BppDecoder, data);
            // Vertical flip swaps the halves of a tall sprite too
            let slot = if entry.flip_v {
                halves.len() - 1 - half
            } else {
                half
            };
            blit_indices(
                &mut image,
                &indices,
                0,
                slot as u32 * TILE_DIM,
                entry.flip_h,
                entry.flip_v,
                |i| {
                    if i == 0 {
                        None
                    } else {
                        palette.color(entry.palette * 4 + i)
                    }
                },
            );
        }

        sprites.push(Sprite {
            id: entry.index,
            x: entry.x as i32,
            y: entry.y as i32 + 1,
            width: image.width,
            height: image.height,
            image,
            priority: Some(!entry.behind_background),
            palette_index: Some(entry.palette),
        });
    }

    log(LogCategory::Sprites, LogLevel::Debug, || {
        format!("{} visible OAM entries", sprites.len())
    });
    Ok(sprites)
}
