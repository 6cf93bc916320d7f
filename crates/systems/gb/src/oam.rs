//! OAM sprite decoding.
//!
//! 40 entries of 4 bytes: y + 16, x + 8, tile, flags. Flags bit 7 puts the
//! sprite behind background colors 1-3, bits 6 and 5 flip vertically and
//! horizontally, bit 4 picks OBP0/OBP1 on DMG, bit 3 the VRAM bank and bits
//! 0-2 the palette on CGB.

use crate::lcd::TILES_PER_BANK;
use ir_core::error::{DecodeError, DecodeResult};
use ir_core::ir::{Palette, Sprite, Tile};
use ir_core::logging::{log, LogCategory, LogLevel};
use ir_core::ppu::tile::{blit_indices, TILE_DIM};
use ir_core::ppu::IndexedPalette;
use ir_core::types::Image;

pub const OAM_SIZE: usize = 160;
pub const OAM_ENTRIES: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OamEntry {
    pub index: usize,
    pub y: u8,
    pub x: u8,
    pub tile: u8,
    pub behind_background: bool,
    pub flip_v: bool,
    pub flip_h: bool,
    pub dmg_palette: u8,
    pub bank: u8,
    pub cgb_palette: u8,
}

impl OamEntry {
    pub fn parse(index: usize, bytes: &[u8]) -> Self {
        let flags = bytes[3];
        Self {
            index,
            y: bytes[0],
            x: bytes[1],
            tile: bytes[2],
            behind_background: flags & 0x80 != 0,
            flip_v: flags & 0x40 != 0,
            flip_h: flags & 0x20 != 0,
            dmg_palette: (flags >> 4) & 1,
            bank: (flags >> 3) & 1,
            cgb_palette: flags & 0x07,
        }
    }

    /// Off-screen entries never show a pixel.
    pub fn is_visible(&self) -> bool {
        self.y != 0 && self.y < 160 && self.x != 0 && self.x < 168
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpriteMode {
    pub tall: bool,
    /// CGB attributes: bank and palette bits apply, OBJ palettes start at 8.
    pub color: bool,
}

/// Assemble visible entries in OAM order from an already decoded tileset.
///
/// `palettes` is the frame palette list: `BGP, OBP0, OBP1` on DMG,
/// `BG0-7, OBJ0-7` on CGB.
pub fn decode(
    oam: &[u8],
    tiles: &[Tile],
    palettes: &[Palette],
    mode: SpriteMode,
) -> DecodeResult<Vec<Sprite>> {
    if oam.len() < OAM_SIZE {
        return Err(DecodeError::min_size("OAM", OAM_SIZE, oam.len()));
    }
    let mut sprites = Vec::new();

    for (index, bytes) in oam.chunks_exact(4).take(OAM_ENTRIES).enumerate() {
        let entry = OamEntry::parse(index, bytes);
        if !entry.is_visible() {
            continue;
        }
        let palette_index = if mode.color {
            8 + entry.cgb_palette as usize
        } else {
            1 + entry.dmg_palette as usize
        };
        let palette = palettes
            .get(palette_index)
            .ok_or(DecodeError::OutOfRange {
                what: "sprite palette",
                index: palette_index,
                limit: palettes.len(),
            })?
            .resolve();

        let numbers: Vec<u16> = if mode.tall {
            vec![(entry.tile & 0xFE) as u16, (entry.tile | 0x01) as u16]
        } else {
            vec![entry.tile as u16]
        };
        let bank = if mode.color { entry.bank as u16 } else { 0 };

        let mut image = Image::new(TILE_DIM, TILE_DIM * numbers.len() as u32);
        for (half, &number) in numbers.iter().enumerate() {
            let slot = (bank * TILES_PER_BANK + number) as usize;
            let indices = tiles
                .get(slot)
                .and_then(|t| t.indices.as_deref())
                .ok_or(DecodeError::OutOfRange {
                    what: "sprite tile",
                    index: slot,
                    limit: tiles.len(),
                })?;
            let row = if entry.flip_v {
                numbers.len() - 1 - half
            } else {
                half
            };
            blit_indices(
                &mut image,
                indices,
                0,
                row as u32 * TILE_DIM,
                entry.flip_h,
                entry.flip_v,
                |i| palette.color(i),
            );
        }

        sprites.push(Sprite {
            id: entry.index,
            x: entry.x as i32 - 8,
            y: entry.y as i32 - 16,
            width: image.width,
            height: image.height,
            image,
            priority: Some(!entry.behind_background),
            palette_index: Some(palette_index as u8),
        });
    }

    log(LogCategory::Sprites, LogLevel::Debug, || {
        format!("{} visible OAM entries", sprites.len())
    });
    Ok(sprites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::dmg_palettes;
    use ir_core::ppu::tile::{content_hash, TILE_PIXELS};

    fn tile(id: usize, index: u8) -> Tile {
        let mut indices = vec![0u8; TILE_PIXELS];
        indices[0] = index;
        Tile {
            id,
            hash: content_hash(&indices),
            indices: Some(indices),
            preview: Image::new(8, 8),
        }
    }

    fn tiles(count: usize) -> Vec<Tile> {
        (0..count).map(|id| tile(id, (id % 3) as u8 + 1)).collect()
    }

    #[test]
    fn test_dmg_sprite_position_and_palette() {
        let mut oam = vec![0u8; OAM_SIZE];
        oam[4..8].copy_from_slice(&[16 + 10, 8 + 20, 2, 0x10]);
        let palettes = dmg_palettes(0xE4, 0xE4, 0x1B);
        let sprites = decode(&oam, &tiles(384), &palettes, SpriteMode::default()).unwrap();
        assert_eq!(sprites.len(), 1);
        let sprite = &sprites[0];
        assert_eq!(sprite.id, 1);
        assert_eq!((sprite.x, sprite.y), (20, 10));
        assert_eq!(sprite.palette_index, Some(2));
        // Tile 2 has index 3 top-left; OBP1 0x1B maps 3 to white
        assert_eq!(sprite.image.get(0, 0), Some([0xFF, 0xFF, 0xFF, 0xFF]));
    }

    #[test]
    fn test_tall_flipped_sprite() {
        let mut oam = vec![0u8; OAM_SIZE];
        oam[0..4].copy_from_slice(&[16, 8, 5, 0x80 | 0x40 | 0x20]);
        let palettes = dmg_palettes(0xE4, 0xE4, 0xE4);
        let mode = SpriteMode {
            tall: true,
            color: false,
        };
        let sprites = decode(&oam, &tiles(384), &palettes, mode).unwrap();
        let sprite = &sprites[0];
        assert_eq!((sprite.width, sprite.height), (8, 16));
        assert_eq!(sprite.priority, Some(false));
        // Tile 4 (top) lands flipped at the bottom right; index 2 -> dark gray
        assert_eq!(sprite.image.get(7, 15), Some([0x55, 0x55, 0x55, 0xFF]));
        // Tile 5 (bottom) lands flipped at the top right; index 3 -> black
        assert_eq!(sprite.image.get(7, 7), Some([0x00, 0x00, 0x00, 0xFF]));
    }

    #[test]
    fn test_offscreen_entries_skipped() {
        let mut oam = vec![0u8; OAM_SIZE];
        oam[0..4].copy_from_slice(&[160, 8, 1, 0]);
        oam[4..8].copy_from_slice(&[16, 0, 1, 0]);
        let palettes = dmg_palettes(0xE4, 0xE4, 0xE4);
        assert!(decode(&oam, &tiles(384), &palettes, SpriteMode::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_cgb_bank_without_second_bank() {
        let mut oam = vec![0u8; OAM_SIZE];
        oam[0..4].copy_from_slice(&[16, 8, 1, 0x08]);
        let palettes: Vec<Palette> = (0..16)
            .map(|n| crate::palette::dmg_palette(&format!("P{}", n), 0xE4))
            .collect();
        let mode = SpriteMode {
            tall: false,
            color: true,
        };
        let result = decode(&oam, &tiles(384), &palettes, mode);
        assert!(matches!(result, Err(DecodeError::OutOfRange { .. })));
    }
}
