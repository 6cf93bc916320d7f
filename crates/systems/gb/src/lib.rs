//! Game Boy and Game Boy Color LCD memory decoding.
//!
//! VRAM bank 0 (and bank 1 on CGB) gives the tiles and the two 32x32 tile
//! maps; the LCD register block gives scroll, map selection and the DMG
//! shade palettes. CGB colors come from palette RAM.

pub mod lcd;
pub mod oam;
pub mod palette;

use ir_core::error::DecodeError;
use ir_core::ir::{
    FrameIR, Layer, LayerKind, Palette, Scroll, Tile, TileSize, Tilemap, TilemapCell, Tileset,
};
use ir_core::logging::{log, LogCategory, LogLevel};
use ir_core::ppu::palette::{parse_hex, ResolvedPalette};
use ir_core::ppu::tile::{decode_tiles, TileFormat};
use ir_core::snapshot::{MemorySnapshot, Region};
use ir_core::system::SystemId;
use ir_core::Adapter;

use lcd::{LcdRegisters, TILES_PER_BANK};
use oam::SpriteMode;

pub const VRAM_BANK_SIZE: usize = 0x2000;
const MAP_DIM: u32 = 32;
const TILE_BYTES: usize = 16;

#[derive(Debug, Clone, Copy, Default)]
pub struct GbAdapter {
    /// Decode as a Game Boy Color (second VRAM bank, palette RAM).
    pub color: bool,
}

impl GbAdapter {
    pub fn dmg() -> Self {
        Self { color: false }
    }

    pub fn cgb() -> Self {
        Self { color: true }
    }

    fn system_id(&self) -> SystemId {
        if self.color {
            SystemId::GameBoyColor
        } else {
            SystemId::GameBoy
        }
    }

    fn decode_palettes(&self, snapshot: &MemorySnapshot, regs: &LcdRegisters, frame: &mut FrameIR) {
        if !self.color {
            frame.palettes = palette::dmg_palettes(regs.bgp, regs.obp0, regs.obp1);
            return;
        }
        match snapshot.region(Region::Palettes).map(palette::cgb_palettes) {
            Some(Ok(palettes)) => frame.palettes = palettes,
            Some(Err(DecodeError::EmptyData { .. })) => frame
                .diagnostics
                .push("CGB palette RAM is all zero: palettes not decoded, retry on a later snapshot"),
            Some(Err(err)) => frame.diagnostics.push(format!("palettes not decoded: {}", err)),
            None => frame
                .diagnostics
                .push("CGB palette RAM unavailable: palettes not decoded"),
        }
    }

    /// Bank 0 tiles, then bank 1 tiles renumbered from 384.
    fn decode_tiles(&self, vram: &[u8], frame: &mut FrameIR) -> bool {
        if vram.len() < VRAM_BANK_SIZE {
            frame.diagnostics.push(format!(
                "tiles not decoded: {}",
                DecodeError::min_size("VRAM", VRAM_BANK_SIZE, vram.len())
            ));
            return false;
        }
        let preview = frame
            .palettes
            .first()
            .map(Palette::resolve)
            .unwrap_or_else(ResolvedPalette::grayscale);
        let count = TILES_PER_BANK as usize;
        let mut tiles = decode_tiles(TileFormat::GameBoy2Bpp, vram, 0, count, &preview);

        if self.color {
            let bank1_end = VRAM_BANK_SIZE + count * TILE_BYTES;
            if vram.len() >= bank1_end {
                let bank1 = decode_tiles(
                    TileFormat::GameBoy2Bpp,
                    vram,
                    VRAM_BANK_SIZE,
                    count,
                    &preview,
                );
                tiles.extend(bank1.into_iter().map(|tile| Tile {
                    id: tile.id + count,
                    ..tile
                }));
            } else {
                frame
                    .diagnostics
                    .push("VRAM bank 1 unavailable: CGB attributes and bank 1 tiles not decoded");
            }
        }

        log(LogCategory::Tiles, LogLevel::Debug, || {
            format!("decoded {} tiles", tiles.len())
        });
        frame.tilesets.push(Tileset {
            tiles,
            tile_size: TileSize::default(),
        });
        true
    }

    fn build_map(&self, vram: &[u8], base: usize, regs: &LcdRegisters) -> Tilemap {
        let attributes = if self.color {
            vram.get(VRAM_BANK_SIZE + base..VRAM_BANK_SIZE + base + (MAP_DIM * MAP_DIM) as usize)
        } else {
            None
        };
        Tilemap::from_fn(MAP_DIM, MAP_DIM, |x, y| {
            let offset = (y * MAP_DIM + x) as usize;
            let entry = vram[base + offset];
            let tile = regs.bg_tile(entry);
            match attributes.map(|attrs| attrs[offset]) {
                Some(attr) => TilemapCell {
                    tile_index: ((attr >> 3) & 1) as u16 * TILES_PER_BANK + tile,
                    palette: attr & 0x07,
                    flip_h: attr & 0x20 != 0,
                    flip_v: attr & 0x40 != 0,
                    priority: attr & 0x80 != 0,
                },
                None => TilemapCell {
                    tile_index: tile,
                    ..TilemapCell::default()
                },
            }
        })
    }

    fn build_layers(&self, vram: &[u8], regs: &LcdRegisters, frame: &mut FrameIR) {
        let palette_group: Vec<usize> = if self.color { (0..8).collect() } else { vec![0] };

        if !regs.bg_enabled() {
            if !self.color {
                frame
                    .diagnostics
                    .push("LCDC bit 0 clear: background and window blank to white");
                return;
            }
            frame
                .diagnostics
                .push("LCDC bit 0 clear: background and window lose priority over sprites");
        }
        frame.layers.push(Layer {
            name: "Background".to_string(),
            kind: LayerKind::Background,
            tileset: 0,
            tilemap: self.build_map(vram, regs.bg_map_base(), regs),
            palette_group: palette_group.clone(),
            scroll: Scroll::uniform(regs.scx as i32, regs.scy as i32),
            wrap: true,
            priority_order: 0,
        });

        // The window is anchored at (WX - 7, WY) and does not wrap on hardware
        if regs.window_visible() {
            frame.layers.push(Layer {
                name: "Window".to_string(),
                kind: LayerKind::Window,
                tileset: 0,
                tilemap: self.build_map(vram, regs.window_map_base(), regs),
                palette_group,
                scroll: Scroll::uniform(-(regs.wx as i32 - 7), -(regs.wy as i32)),
                wrap: false,
                priority_order: 1,
            });
        }
    }

    fn decode_sprites(&self, snapshot: &MemorySnapshot, regs: &LcdRegisters, frame: &mut FrameIR) {
        if !regs.obj_enabled() {
            return;
        }
        let Some(table) = snapshot.region(Region::Oam) else {
            frame.diagnostics.push("OAM unavailable: sprites not decoded");
            return;
        };
        if frame.palettes.is_empty() {
            frame
                .diagnostics
                .push("sprites not assembled: palettes unavailable");
            return;
        }
        let mode = SpriteMode {
            tall: regs.tall_sprites(),
            color: self.color,
        };
        let tiles = &frame.tilesets[0].tiles;
        match oam::decode(table, tiles, &frame.palettes, mode) {
            Ok(sprites) => frame.sprites = sprites,
            Err(err) => frame.diagnostics.push(format!("sprites not decoded: {}", err)),
        }
    }
}

impl Adapter for GbAdapter {
    fn system(&self) -> SystemId {
        self.system_id()
    }

    fn regions(&self) -> &'static [Region] {
        if self.color {
            &[Region::Vram, Region::Palettes, Region::Oam, Region::Regs]
        } else {
            &[Region::Vram, Region::Oam, Region::Regs]
        }
    }

    fn build_frame_ir(&self, snapshot: &MemorySnapshot) -> FrameIR {
        let mut frame = FrameIR::new(self.system_id());

        let regs = LcdRegisters::parse(snapshot.region(Region::Regs));
        if regs.from_defaults {
            frame
                .diagnostics
                .push("LCD registers unavailable: using post-boot values (approximation)");
        }
        if !regs.lcd_enabled() {
            frame.diagnostics.push("LCD disabled: the screen shows no layers");
        }

        self.decode_palettes(snapshot, &regs, &mut frame);
        frame.backdrop = if !self.color && !regs.bg_enabled() {
            Some(palette::BLANK)
        } else {
            frame.palettes.first().and_then(|p| parse_hex(&p.colors[0]))
        };

        match snapshot.region(Region::Vram) {
            Some(vram) => {
                if self.decode_tiles(vram, &mut frame) {
                    self.build_layers(vram, &regs, &mut frame);
                    self.decode_sprites(snapshot, &regs, &mut frame);
                }
            }
            None => frame
                .diagnostics
                .push("VRAM unavailable: tiles, layers and sprites not decoded"),
        }

        match snapshot.framebuffer_image() {
            Ok(Some(image)) => frame.framebuffer = Some(image),
            Ok(None) => frame.diagnostics.push("framebuffer unavailable"),
            Err(err) => frame.diagnostics.push(format!("framebuffer ignored: {}", err)),
        }

        log(LogCategory::Adapter, LogLevel::Info, || {
            format!(
                "{} frame: {} palettes, {} layers, {} sprites",
                frame.system.display_name(),
                frame.palettes.len(),
                frame.layers.len(),
                frame.sprites.len()
            )
        });
        frame
    }
}
