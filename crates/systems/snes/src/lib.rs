//! SNES PPU memory decoding.
//!
//! Covers CGRAM palettes and 4bpp VRAM tiles. Background layers and OAM
//! sprites need the full PPU register state and are reported, not guessed.

pub mod cgram;

use ir_core::error::DecodeError;
use ir_core::ir::{FrameIR, Palette, TileSize, Tileset};
use ir_core::logging::{log, LogCategory, LogLevel};
use ir_core::ppu::palette::{parse_hex, ResolvedPalette};
use ir_core::ppu::tile::{decode_tiles, TileFormat};
use ir_core::snapshot::{MemorySnapshot, Region};
use ir_core::system::SystemId;
use ir_core::Adapter;

pub const VRAM_SIZE: usize = 0x10000;
/// 4bpp tiles in 64 KiB of VRAM.
pub const TILE_COUNT: usize = 2048;

#[derive(Debug, Clone, Copy, Default)]
pub struct SnesAdapter;

impl SnesAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Adapter for SnesAdapter {
    fn system(&self) -> SystemId {
        SystemId::Snes
    }

    fn regions(&self) -> &'static [Region] {
        &[Region::Vram, Region::Cram, Region::Palettes]
    }

    fn build_frame_ir(&self, snapshot: &MemorySnapshot) -> FrameIR {
        let mut frame = FrameIR::new(SystemId::Snes);

        // Frontends store CGRAM under either name
        let cgram = snapshot
            .region(Region::Cram)
            .or_else(|| snapshot.region(Region::Palettes));
        match cgram.map(cgram::decode) {
            Some(Ok(palettes)) => {
                frame.backdrop = parse_hex(&palettes[0].colors[0]);
                frame.palettes = palettes;
            }
            Some(Err(DecodeError::EmptyData { .. })) => frame
                .diagnostics
                .push("CGRAM is all zero: palettes not decoded, retry on a later snapshot"),
            Some(Err(err)) => frame.diagnostics.push(format!("palettes not decoded: {}", err)),
            None => frame.diagnostics.push("CGRAM unavailable: palettes not decoded"),
        }

        match snapshot.region(Region::Vram) {
            Some(vram) if vram.len() >= VRAM_SIZE => {
                let preview = frame
                    .palettes
                    .first()
                    .map(Palette::resolve)
                    .unwrap_or_else(ResolvedPalette::grayscale);
                let tiles = decode_tiles(TileFormat::Snes4Bpp, vram, 0, TILE_COUNT, &preview);
                frame.tilesets.push(Tileset {
                    tiles,
                    tile_size: TileSize::default(),
                });
            }
            Some(vram) => frame.diagnostics.push(format!(
                "tiles not decoded: {}",
                DecodeError::min_size("VRAM", VRAM_SIZE, vram.len())
            )),
            None => frame.diagnostics.push("VRAM unavailable: tiles not decoded"),
        }

        frame
            .diagnostics
            .push("BG layers not reconstructed: PPU register state is not captured");
        frame
            .diagnostics
            .push("OAM sprites not reconstructed: PPU register state is not captured");

        match snapshot.framebuffer_image() {
            Ok(Some(image)) => frame.framebuffer = Some(image),
            Ok(None) => frame.diagnostics.push("framebuffer unavailable"),
            Err(err) => frame.diagnostics.push(format!("framebuffer ignored: {}", err)),
        }

        log(LogCategory::Adapter, LogLevel::Info, || {
            format!(
                "SNES frame: {} palettes, {} tiles",
                frame.palettes.len(),
                frame.tilesets.first().map_or(0, |t| t.tiles.len())
            )
        });
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palettes_from_either_region() {
        let mut cgram = vec![0u8; 512];
        cgram[0..2].copy_from_slice(&0x001Fu16.to_le_bytes());
        for region in [Region::Cram, Region::Palettes] {
            let snapshot = MemorySnapshot::new().with_region(region, &cgram);
            let frame = SnesAdapter::new().build_frame_ir(&snapshot);
            assert_eq!(frame.palettes.len(), 16);
            assert_eq!(frame.backdrop, Some([255, 0, 0, 255]));
        }
    }

    #[test]
    fn test_tiles_decoded_from_full_vram() {
        let mut vram = vec![0u8; VRAM_SIZE];
        // Tile 1, row 0, plane 3: top-left pixel index 8
        vram[32 + 17] = 0x80;
        let frame = SnesAdapter::new().build_frame_ir(&MemorySnapshot::new().with_region(Region::Vram, &vram));
        let tiles = &frame.tilesets[0].tiles;
        assert_eq!(tiles.len(), TILE_COUNT);
        assert_eq!(tiles[1].indices.as_ref().unwrap()[0], 8);
        assert!(frame.diagnostics.contains("CGRAM unavailable"));
        assert!(frame.diagnostics.contains("BG layers not reconstructed"));
    }

    #[test]
    fn test_short_vram_and_zero_cgram() {
        let snapshot = MemorySnapshot::new()
            .with_region(Region::Vram, &[0u8; 0x800])
            .with_region(Region::Cram, &[0u8; 512]);
        let frame = SnesAdapter::new().build_frame_ir(&snapshot);
        assert!(frame.tilesets.is_empty());
        assert!(frame.palettes.is_empty());
        assert!(frame.diagnostics.contains("tiles not decoded"));
        assert!(frame.diagnostics.contains("all zero"));
    }
}
