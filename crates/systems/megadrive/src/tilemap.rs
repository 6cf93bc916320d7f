//! Name table (tilemap) reconstruction.
//!
//! Each cell is one word: `PCCV HTTT TTTT TTTT`
//! (priority, palette line, vertical flip, horizontal flip, tile index).

use ir_core::ir::{Tilemap, TilemapCell};
use ir_core::logging::{log, LogCategory, LogLevel};

/// A rebuilt tilemap and how many of its cells lay past the end of VRAM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructedTilemap {
    pub tilemap: Tilemap,
    pub truncated_cells: usize,
}

pub fn decode_cell(word: u16) -> TilemapCell {
    TilemapCell {
        tile_index: word & 0x07FF,
        flip_h: word & 0x0800 != 0,
        flip_v: word & 0x1000 != 0,
        palette: ((word >> 13) & 0x03) as u8,
        priority: word & 0x8000 != 0,
    }
}

/// Read a `width_tiles` x `height_tiles` name table at `base`.
///
/// Cells whose word lies outside `pattern_ram` stay at the default cell and
/// are counted in `truncated_cells`.
pub fn build(
    pattern_ram: &[u8],
    base: usize,
    width_tiles: u32,
    height_tiles: u32,
) -> ReconstructedTilemap {
    let mut truncated = 0;
    let tilemap = Tilemap::from_fn(width_tiles, height_tiles, |col, row| {
        let addr = base + (row as usize * width_tiles as usize + col as usize) * 2;
        match pattern_ram.get(addr..addr + 2) {
            Some(bytes) => decode_cell(u16::from_le_bytes([bytes[0], bytes[1]])),
            None => {
                truncated += 1;
                TilemapCell::default()
            }
        }
    });

    if truncated > 0 {
        log(LogCategory::Layout, LogLevel::Warn, || {
            format!(
                "name table at 0x{:04X} ({}x{}) runs past VRAM: {} cells defaulted",
                base, width_tiles, height_tiles, truncated
            )
        });
    }

    ReconstructedTilemap {
        tilemap,
        truncated_cells: truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_cell_fields() {
        let cell = decode_cell(0b1_10_1_1_00000000101);
        assert_eq!(cell.tile_index, 5);
        assert!(cell.flip_h);
        assert!(cell.flip_v);
        assert_eq!(cell.palette, 2);
        assert!(cell.priority);

        let cell = decode_cell(0x07FF);
        assert_eq!(cell.tile_index, 0x7FF);
        assert!(!cell.flip_h && !cell.flip_v && !cell.priority);
        assert_eq!(cell.palette, 0);
    }

    #[test]
    fn test_build_reads_little_endian_words() {
        let mut vram = vec![0u8; 0x10000];
        let base = 0xC000;
        // Row 1, column 2 of a 4-wide map
        let addr = base + (4 + 2) * 2;
        vram[addr..addr + 2].copy_from_slice(&0x6123u16.to_le_bytes());
        let built = build(&vram, base, 4, 2);
        assert_eq!(built.truncated_cells, 0);
        assert_eq!(built.tilemap.cells().len(), 8);
        let cell = built.tilemap.cell(2, 1).unwrap();
        assert_eq!(cell.tile_index, 0x123);
        assert_eq!(cell.palette, 3);
        assert!(!cell.priority);
    }

    #[test]
    fn test_truncated_cells_default() {
        let vram = vec![0xFFu8; 0x10];
        let built = build(&vram, 0x08, 4, 2);
        // 8 bytes available from 0x08: four cells
        assert_eq!(built.truncated_cells, 4);
        assert_eq!(built.tilemap.cells().len(), 8);
        assert_eq!(*built.tilemap.cell(0, 1).unwrap(), TilemapCell::default());
        assert!(built.tilemap.cell(3, 0).unwrap().priority);
    }
}
