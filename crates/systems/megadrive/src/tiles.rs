//! Pattern RAM decoding.

use ir_core::error::{DecodeError, DecodeResult};
use ir_core::ir::{Tile, TileSize, Tileset};
use ir_core::logging::{log, LogCategory, LogLevel};
use ir_core::ppu::tile::{decode_tiles, TileFormat};
use ir_core::ppu::ResolvedPalette;

/// Full 64 KiB VRAM.
pub const PATTERN_RAM_SIZE: usize = 0x10000;
pub const TILE_BYTES: usize = 32;
/// Tiles addressable by a 11-bit tile index.
pub const DEFAULT_TILE_COUNT: usize = 2048;

/// Decode `count` tiles from `start_offset`, previewed with a gray ramp.
pub fn decode(pattern_ram: &[u8], start_offset: usize, count: usize) -> DecodeResult<Vec<Tile>> {
    decode_with_preview(pattern_ram, start_offset, count, &ResolvedPalette::grayscale())
}

/// Decode tiles, coloring previews with `preview`.
///
/// Requires the whole 64 KiB VRAM. Fewer than `count` tiles come back when
/// the RAM ends first.
pub fn decode_with_preview(
    pattern_ram: &[u8],
    start_offset: usize,
    count: usize,
    preview: &ResolvedPalette,
) -> DecodeResult<Vec<Tile>> {
    if pattern_ram.len() < PATTERN_RAM_SIZE {
        return Err(DecodeError::min_size(
            "pattern RAM",
            PATTERN_RAM_SIZE,
            pattern_ram.len(),
        ));
    }
    Ok(decode_available(pattern_ram, start_offset, count, preview))
}

/// Decode whatever whole tiles a partial capture holds, with no size check.
pub fn decode_available(
    pattern_ram: &[u8],
    start_offset: usize,
    count: usize,
    preview: &ResolvedPalette,
) -> Vec<Tile> {
    let tiles = decode_tiles(
        TileFormat::MegaDrive4Bpp,
        pattern_ram,
        start_offset,
        count,
        preview,
    );
    log(LogCategory::Tiles, LogLevel::Debug, || {
        let empty = tiles.iter().filter(|t| t.is_empty()).count();
        format!(
            "decoded {} tiles from 0x{:04X} ({} empty)",
            tiles.len(),
            start_offset,
            empty
        )
    });
    tiles
}

/// True iff all 64 indices are 0.
pub fn is_empty(tile: &Tile) -> bool {
    tile.is_empty()
}

pub fn tileset(tiles: Vec<Tile>) -> Tileset {
    Tileset {
        tiles,
        tile_size: TileSize::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_full_vram() {
        assert!(matches!(
            decode(&vec![0u8; PATTERN_RAM_SIZE - 1], 0, 1),
            Err(DecodeError::InvalidInputSize { .. })
        ));
    }

    #[test]
    fn test_zero_tile_is_empty() {
        let vram = vec![0u8; PATTERN_RAM_SIZE];
        let tiles = decode(&vram, 0, DEFAULT_TILE_COUNT).unwrap();
        assert_eq!(tiles.len(), DEFAULT_TILE_COUNT);
        assert!(is_empty(&tiles[0]));
        assert_eq!(tiles[0].indices.as_deref(), Some(&[0u8; 64][..]));
    }

    #[test]
    fn test_plane_zero_row() {
        let mut vram = vec![0u8; PATTERN_RAM_SIZE];
        // Tile 3, plane 0, row 5
        vram[3 * TILE_BYTES + 5] = 0xFF;
        let tiles = decode(&vram, 0, 4).unwrap();
        let indices = tiles[3].indices.as_ref().unwrap();
        assert_eq!(&indices[40..48], &[1, 1, 1, 1, 1, 1, 1, 1]);
        assert!(!is_empty(&tiles[3]));
        assert!(is_empty(&tiles[2]));
    }

    #[test]
    fn test_start_offset_and_tail() {
        let mut vram = vec![0u8; PATTERN_RAM_SIZE];
        vram[TILE_BYTES * 2 + 24] = 0x80; // tile 2, plane 3, row 0
        let tiles = decode(&vram, TILE_BYTES * 2, 1).unwrap();
        assert_eq!(tiles[0].indices.as_ref().unwrap()[0], 8);

        let tiles = decode(&vram, PATTERN_RAM_SIZE - TILE_BYTES, 10).unwrap();
        assert_eq!(tiles.len(), 1);
    }

    #[test]
    fn test_decode_available_on_short_capture() {
        let mut vram = vec![0u8; 0x1000 + 20];
        vram[5 * TILE_BYTES] = 0x80;
        let tiles = decode_available(&vram, 0, DEFAULT_TILE_COUNT, &ResolvedPalette::grayscale());
        assert_eq!(tiles.len(), 0x1000 / TILE_BYTES);
        assert_eq!(tiles[5].indices.as_ref().unwrap()[0], 1);
    }

    #[test]
    fn test_preview_uses_given_palette() {
        let mut vram = vec![0u8; PATTERN_RAM_SIZE];
        vram[0] = 0x80;
        let mut colors = [None; 16];
        colors[1] = Some([9, 8, 7, 255]);
        let tiles =
            decode_with_preview(&vram, 0, 1, &ResolvedPalette::from_colors(colors)).unwrap();
        assert_eq!(tiles[0].preview.get(0, 0), Some([9, 8, 7, 255]));
        assert_eq!(tiles[0].preview.get(1, 0), Some([0, 0, 0, 0]));
    }
}
