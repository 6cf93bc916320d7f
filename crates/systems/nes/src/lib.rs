//! NES / Famicom 2C02 memory decoding.
//!
//! Palettes come from palette RAM, tiles from the 8 KiB CHR pattern tables
//! and sprites from OAM. Nametables are not part of a snapshot, so no
//! background layer is reconstructed.

pub mod oam;
pub mod palette;

use ir_core::error::DecodeError;
use ir_core::ir::{FrameIR, Palette, TileSize, Tileset};
use ir_core::logging::{log, LogCategory, LogLevel};
use ir_core::ppu::palette::{parse_hex, ResolvedPalette};
use ir_core::ppu::tile::{decode_tiles, TileFormat};
use ir_core::snapshot::{MemorySnapshot, Region};
use ir_core::system::SystemId;
use ir_core::Adapter;

use oam::SpriteControl;

/// Both pattern tables.
pub const CHR_SIZE: usize = 0x2000;
pub const CHR_TILE_COUNT: usize = 512;

#[derive(Debug, Clone, Copy, Default)]
pub struct NesAdapter;

impl NesAdapter {
    pub fn new() -> Self {
        Self
    }

    fn decode_tiles(&self, chr: &[u8], frame: &mut FrameIR) -> bool {
        if chr.len() < CHR_SIZE {
            frame.diagnostics.push(format!(
                "tiles not decoded: {}",
                DecodeError::min_size("CHR pattern tables", CHR_SIZE, chr.len())
            ));
            return false;
        }
        let preview = frame
            .palettes
            .first()
            .map(Palette::resolve)
            .unwrap_or_else(ResolvedPalette::grayscale);
        let tiles = decode_tiles(TileFormat::Nes2Bpp, chr, 0, CHR_TILE_COUNT, &preview);
        log(LogCategory::Tiles, LogLevel::Debug, || {
            format!("decoded {} CHR tiles", tiles.len())
        });
        frame.tilesets.push(Tileset {
            tiles,
            tile_size: TileSize::default(),
        });
        true
    }

    fn decode_sprites(&self, snapshot: &MemorySnapshot, chr: &[u8], frame: &mut FrameIR) {
        let Some(table) = snapshot.region(Region::Oam) else {
            frame.diagnostics.push("OAM unavailable: sprites not decoded");
            return;
        };
        let Some(obj) = frame.palettes.get(1) else {
            frame
                .diagnostics
                .push("sprites not assembled: palettes unavailable");
            return;
        };
        let control = match snapshot.region(Region::Regs).and_then(|r| r.first()) {
            Some(&ctrl) => SpriteControl::from_ppuctrl(ctrl),
            None => {
                frame
                    .diagnostics
                    .push("PPUCTRL unavailable: assuming 8x8 sprites from pattern table 0");
                SpriteControl::default()
            }
        };
        match oam::decode(table, chr, obj, control) {
            Ok(sprites) => frame.sprites = sprites,
            Err(err) => frame.diagnostics.push(format!("sprites not decoded: {}", err)),
        }
    }
}

impl Adapter for NesAdapter {
    fn system(&self) -> SystemId {
        SystemId::Nes
    }

    fn regions(&self) -> &'static [Region] {
        &[Region::Vram, Region::Palettes, Region::Oam, Region::Regs]
    }

    fn build_frame_ir(&self, snapshot: &MemorySnapshot) -> FrameIR {
        let mut frame = FrameIR::new(SystemId::Nes);

        match snapshot.region(Region::Palettes).map(palette::decode) {
            Some(Ok(palettes)) => {
                frame.backdrop = parse_hex(&palettes[0].colors[0]);
                frame.palettes = palettes;
            }
            Some(Err(DecodeError::EmptyData { .. })) => frame
                .diagnostics
                .push("palette RAM is all zero: palettes not decoded, retry on a later snapshot"),
            Some(Err(err)) => frame.diagnostics.push(format!("palettes not decoded: {}", err)),
            None => frame
                .diagnostics
                .push("palette RAM unavailable: palettes not decoded"),
        }

        match snapshot.region(Region::Vram) {
            Some(chr) => {
                if self.decode_tiles(chr, &mut frame) {
                    self.decode_sprites(snapshot, chr, &mut frame);
                }
            }
            None => frame
                .diagnostics
                .push("CHR pattern tables unavailable: tiles and sprites not decoded"),
        }

        frame
            .diagnostics
            .push("nametables are not captured: background layer not reconstructed");

        match snapshot.framebuffer_image() {
            Ok(Some(image)) => frame.framebuffer = Some(image),
            Ok(None) => frame.diagnostics.push("framebuffer unavailable"),
            Err(err) => frame.diagnostics.push(format!("framebuffer ignored: {}", err)),
        }

        log(LogCategory::Adapter, LogLevel::Info, || {
            format!(
                "NES frame: {} palettes, {} sprites, {} diagnostics",
                frame.palettes.len(),
                frame.sprites.len(),
                frame.diagnostics.len()
            )
        });
        frame
    }
}
