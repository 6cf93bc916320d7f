//! Sega Mega Drive / Genesis VDP memory decoding.
//!
//! Reads CRAM, VRAM, VSRAM, the sprite attribute table and the VDP register
//! block from a snapshot and assembles them into a `FrameIR`.

pub mod palette;
pub mod scroll;
pub mod sprites;
pub mod tilemap;
pub mod tiles;
pub mod vdp;

use ir_core::error::DecodeError;
use ir_core::ir::{FrameIR, Layer, LayerKind, Palette, Scroll};
use ir_core::logging::{log, LogCategory, LogLevel};
use ir_core::ppu::palette::{parse_hex, ResolvedPalette};
use ir_core::snapshot::{MemorySnapshot, Region};
use ir_core::system::SystemId;
use ir_core::Adapter;

use scroll::Plane;
use vdp::VdpLayout;

/// Cell palette selectors 0-3 map straight onto the four CRAM lines.
const PALETTE_GROUP: [usize; 4] = [0, 1, 2, 3];

#[derive(Debug, Clone, Copy, Default)]
pub struct MegaDriveAdapter;

impl MegaDriveAdapter {
    pub fn new() -> Self {
        Self
    }

    fn decode_palettes(&self, snapshot: &MemorySnapshot, frame: &mut FrameIR) {
        let Some(cram) = snapshot.region(Region::Cram) else {
            frame.diagnostics.push("CRAM unavailable: palettes not decoded");
            return;
        };
        match palette::decode(cram) {
            Ok(palettes) => frame.palettes = palettes,
            Err(DecodeError::EmptyData { .. }) => frame
                .diagnostics
                .push("CRAM is all zero: palettes not decoded, retry on a later snapshot"),
            Err(err) => frame.diagnostics.push(format!("palettes not decoded: {}", err)),
        }
    }

    /// Tiles are previewed with palette line 0 when it decoded. A VRAM
    /// capture shorter than 64 KiB still yields the whole tiles it holds.
    fn decode_tiles(&self, vram: &[u8], frame: &mut FrameIR) {
        let preview = frame
            .palettes
            .first()
            .map(Palette::resolve)
            .unwrap_or_else(ResolvedPalette::grayscale);
        let decoded = match tiles::decode_with_preview(vram, 0, tiles::DEFAULT_TILE_COUNT, &preview) {
            Ok(decoded) => decoded,
            Err(err) => {
                let partial =
                    tiles::decode_available(vram, 0, tiles::DEFAULT_TILE_COUNT, &preview);
                frame.diagnostics.push(format!(
                    "pattern RAM truncated ({}): decoded the {} whole tiles present",
                    err,
                    partial.len()
                ));
                partial
            }
        };
        frame.tilesets.push(tiles::tileset(decoded));
    }

    fn build_layers(
        &self,
        vram: &[u8],
        vsram: Option<&[u8]>,
        layout: &VdpLayout,
        frame: &mut FrameIR,
    ) {
        if layout.hscroll_table_base.is_none() {
            frame
                .diagnostics
                .push("horizontal scroll table unknown without registers: plane x scroll read as 0");
        }
        if vsram.is_none() {
            frame
                .diagnostics
                .push("VSRAM unavailable: plane y scroll read as 0");
        }

        let size = layout.plane_size;
        let planes = [
            ("Plane A", Some(Plane::A), layout.plane_a_base, size.width, size.height, 1),
            ("Plane B", Some(Plane::B), layout.plane_b_base, size.width, size.height, 0),
        ];
        for (name, plane, base, width, height, order) in planes {
            self.push_layer(vram, vsram, layout, frame, name, plane, base, (width, height), order);
        }

        if layout.window_base != 0 {
            self.push_layer(
                vram,
                vsram,
                layout,
                frame,
                "Window",
                None,
                layout.window_base,
                (layout.window_width(), 32),
                2,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn push_layer(
        &self,
        vram: &[u8],
        vsram: Option<&[u8]>,
        layout: &VdpLayout,
        frame: &mut FrameIR,
        name: &str,
        plane: Option<Plane>,
        base: usize,
        (width, height): (u32, u32),
        priority_order: u32,
    ) {
        let built = tilemap::build(vram, base, width, height);
        if built.truncated_cells > 0 {
            frame.diagnostics.push(format!(
                "{} name table at 0x{:04X} truncated: {} cells past end of VRAM",
                name, base, built.truncated_cells
            ));
        }

        // The window plane does not scroll
        let scroll = match plane {
            Some(plane) => {
                let read = scroll::plane_scroll(vram, vsram, layout, plane);
                if read.truncated_lines > 0 {
                    frame.diagnostics.push(format!(
                        "{} horizontal scroll table truncated: {} lines read as 0",
                        name, read.truncated_lines
                    ));
                }
                if read.truncated_columns > 0 {
                    frame.diagnostics.push(format!(
                        "{} vertical scroll truncated: {} VSRAM entries read as 0",
                        name, read.truncated_columns
                    ));
                }
                read.scroll
            }
            None => Scroll::default(),
        };

        frame.layers.push(Layer {
            name: name.to_string(),
            kind: if plane.is_some() {
                LayerKind::Background
            } else {
                LayerKind::Window
            },
            tileset: 0,
            tilemap: built.tilemap,
            palette_group: PALETTE_GROUP.to_vec(),
            scroll,
            wrap: true,
            priority_order,
        });
    }

    fn decode_sprites(
        &self,
        snapshot: &MemorySnapshot,
        vram: &[u8],
        layout: &VdpLayout,
        frame: &mut FrameIR,
    ) {
        let table = match snapshot.region(Region::Sat) {
            Some(sat) => sat,
            None => {
                let start = layout.sprite_table_base;
                match vram.get(start..start + sprites::SAT_SIZE) {
                    Some(table) => table,
                    None => {
                        frame.diagnostics.push(format!(
                            "sprite table at 0x{:04X} lies outside VRAM: sprites not decoded",
                            start
                        ));
                        return;
                    }
                }
            }
        };
        if frame.palettes.is_empty() {
            frame
                .diagnostics
                .push("sprites not assembled: palettes unavailable");
            return;
        }
        match sprites::decode(table, vram, &frame.palettes) {
            Ok(decoded) => frame.sprites = decoded,
            Err(err) => frame.diagnostics.push(format!("sprites not decoded: {}", err)),
        }
    }
}

impl Adapter for MegaDriveAdapter {
    fn system(&self) -> SystemId {
        SystemId::MegaDrive
    }

    fn regions(&self) -> &'static [Region] {
        &[Region::Vram, Region::Cram, Region::Vsram, Region::Sat, Region::Regs]
    }

    fn build_frame_ir(&self, snapshot: &MemorySnapshot) -> FrameIR {
        let mut frame = FrameIR::new(SystemId::MegaDrive);

        self.decode_palettes(snapshot, &mut frame);

        let layout = vdp::parse(snapshot.region(Region::Regs));
        if layout.from_defaults {
            frame
                .diagnostics
                .push("VDP registers unavailable: using default layout (approximation)");
        }

        match snapshot.region(Region::Vram) {
            Some(vram) => {
                self.decode_tiles(vram, &mut frame);
                self.build_layers(vram, snapshot.region(Region::Vsram), &layout, &mut frame);
                self.decode_sprites(snapshot, vram, &layout, &mut frame);
            }
            None => frame
                .diagnostics
                .push("pattern RAM unavailable: tiles, layers and sprites not decoded"),
        }

        if let Some((line, index)) = layout.backdrop {
            frame.backdrop = frame
                .palettes
                .get(line as usize)
                .and_then(|p| parse_hex(&p.colors[index as usize]));
        }

        match snapshot.framebuffer_image() {
            Ok(Some(image)) => frame.framebuffer = Some(image),
            Ok(None) => frame.diagnostics.push("framebuffer unavailable"),
            Err(err) => frame.diagnostics.push(format!("framebuffer ignored: {}", err)),
        }

        log(LogCategory::Adapter, LogLevel::Info, || {
            format!(
                "Mega Drive frame: {} palettes, {} tiles, {} layers, {} sprites, {} diagnostics",
                frame.palettes.len(),
                frame.tilesets.first().map_or(0, |t| t.tiles.len()),
                frame.layers.len(),
                frame.sprites.len(),
                frame.diagnostics.len()
            )
        });
        frame
    }
}
