use ir_core::compositor::{render, RenderOptions};
use ir_core::ir::LayerKind;
use ir_core::snapshot::{MemorySnapshot, Region};
use ir_core::system::SystemId;
use ir_core::Adapter;
use ir_gb::GbAdapter;

const WHITE: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];
const BLACK: [u8; 4] = [0x00, 0x00, 0x00, 0xFF];

/// Fill tile `n` of `bank` with color index 3.
fn solid_tile(vram: &mut [u8], bank: usize, n: usize) {
    let start = bank * 0x2000 + n * 16;
    vram[start..start + 16].fill(0xFF);
}

fn registers(lcdc: u8, scx: u8, scy: u8) -> Vec<u8> {
    let mut regs = vec![0u8; 12];
    regs[0] = lcdc;
    regs[2] = scy;
    regs[3] = scx;
    regs[7] = 0xE4;
    regs[8] = 0xE4;
    regs[9] = 0xE4;
    regs
}

#[test]
fn test_dmg_background_scroll() {
    let mut vram = vec![0u8; 0x2000];
    solid_tile(&mut vram, 0, 1);
    vram[0x1800 + 1] = 1; // map cell (1, 0)

    let snapshot = MemorySnapshot::new()
        .with_region(Region::Vram, &vram)
        .with_region(Region::Regs, &registers(0x91, 4, 0));
    let frame = GbAdapter::dmg().build_frame_ir(&snapshot);
    assert_eq!(frame.system, SystemId::GameBoy);
    assert_eq!(frame.palettes.len(), 3);
    assert_eq!(frame.tilesets[0].tiles.len(), 384);
    assert_eq!(frame.layers.len(), 1);
    assert_eq!(frame.backdrop, Some(WHITE));

    let image = render(&frame, Some(160), Some(144), &RenderOptions::default());
    // Cell (1, 0) spans plane x 8..16, screen x 4..12 after SCX 4
    assert_eq!(image.get(3, 0), Some(WHITE));
    assert_eq!(image.get(4, 0), Some(BLACK));
    assert_eq!(image.get(11, 7), Some(BLACK));
    assert_eq!(image.get(12, 0), Some(WHITE));
}

#[test]
fn test_dmg_signed_tile_addressing_and_window() {
    let mut vram = vec![0u8; 0x2000];
    // Signed entry 0x00 is tile 256 (0x9000)
    solid_tile(&mut vram, 0, 256);
    // LCDC: LCD on, window on with map 0x1C00, BG map 0x1800, signed tiles
    let mut regs = registers(0x80 | 0x40 | 0x20 | 0x01, 0, 0);
    regs[0xA] = 16;
    regs[0xB] = 7;

    let snapshot = MemorySnapshot::new()
        .with_region(Region::Vram, &vram)
        .with_region(Region::Regs, &regs);
    let frame = GbAdapter::dmg().build_frame_ir(&snapshot);
    assert_eq!(frame.layers.len(), 2);
    assert_eq!(frame.layers[1].kind, LayerKind::Window);
    assert_eq!(frame.layers[1].scroll.y, -16);
    assert_eq!(frame.layers[0].tilemap.cell(0, 0).unwrap().tile_index, 256);

    // Window is left out unless selected
    let image = render(&frame, Some(160), Some(144), &RenderOptions::default());
    assert_eq!(image.get(0, 0), Some(BLACK));
}

#[test]
fn test_cgb_attributes_select_bank_and_palette() {
    let mut vram = vec![0u8; 0x4000];
    solid_tile(&mut vram, 1, 2);
    vram[0x1800] = 2;
    vram[0x2000 + 0x1800] = 0x08 | 0x03; // bank 1, palette 3

    let mut palette_ram = vec![0u8; 128];
    // BG3 color 3: pure green
    palette_ram[3 * 8 + 6..3 * 8 + 8].copy_from_slice(&0x03E0u16.to_le_bytes());

    let snapshot = MemorySnapshot::new()
        .with_region(Region::Vram, &vram)
        .with_region(Region::Palettes, &palette_ram)
        .with_region(Region::Regs, &registers(0x91, 0, 0));
    let frame = GbAdapter::cgb().build_frame_ir(&snapshot);
    assert_eq!(frame.system, SystemId::GameBoyColor);
    assert_eq!(frame.palettes.len(), 16);
    assert_eq!(frame.tilesets[0].tiles.len(), 768);
    let cell = frame.layers[0].tilemap.cell(0, 0).unwrap();
    assert_eq!((cell.tile_index, cell.palette), (384 + 2, 3));

    let image = render(&frame, Some(160), Some(144), &RenderOptions::default());
    assert_eq!(image.get(0, 0), Some([0, 255, 0, 255]));
}

#[test]
fn test_dmg_sprite_drawn_over_background() {
    let mut vram = vec![0u8; 0x2000];
    solid_tile(&mut vram, 0, 1);
    let mut oam = vec![0u8; 160];
    oam[0..4].copy_from_slice(&[16 + 20, 8 + 30, 1, 0]);

    let snapshot = MemorySnapshot::new()
        .with_region(Region::Vram, &vram)
        .with_region(Region::Oam, &oam)
        .with_region(Region::Regs, &registers(0x93, 0, 0));
    let frame = GbAdapter::dmg().build_frame_ir(&snapshot);
    assert_eq!(frame.sprites.len(), 1);
    let image = render(&frame, Some(160), Some(144), &RenderOptions::default());
    assert_eq!(image.get(30, 20), Some(BLACK));
    assert_eq!(image.get(38, 20), Some(WHITE));
}

#[test]
fn test_missing_inputs_are_reported() {
    let frame = GbAdapter::cgb().build_frame_ir(&MemorySnapshot::new());
    assert!(frame.diagnostics.contains("LCD registers unavailable"));
    assert!(frame.diagnostics.contains("CGB palette RAM unavailable"));
    assert!(frame.diagnostics.contains("VRAM unavailable"));
    assert!(frame.backdrop.is_none());
}

#[test]
fn test_window_starts_at_wx_and_does_not_wrap() {
    let mut vram = vec![0u8; 0x2000];
    solid_tile(&mut vram, 0, 1);
    vram[0x1C00..0x2000].fill(1);
    // LCD on, window on with map 0x1C00, unsigned tiles, BG on
    let mut regs = registers(0x80 | 0x40 | 0x20 | 0x10 | 0x01, 0, 0);
    regs[0xA] = 16;
    regs[0xB] = 87;

    let snapshot = MemorySnapshot::new()
        .with_region(Region::Vram, &vram)
        .with_region(Region::Regs, &regs);
    let frame = GbAdapter::dmg().build_frame_ir(&snapshot);
    assert_eq!(frame.layers.len(), 2);
    assert!(!frame.layers[1].wrap);

    let image = render(&frame, Some(160), Some(144), &RenderOptions::layers([1]));
    assert_eq!(image.get(0, 0), Some(WHITE));
    assert_eq!(image.get(79, 20), Some(WHITE));
    assert_eq!(image.get(80, 15), Some(WHITE));
    assert_eq!(image.get(80, 16), Some(BLACK));
    assert_eq!(image.get(159, 143), Some(BLACK));

    let both = render(&frame, Some(160), Some(144), &RenderOptions::layers([0, 1]));
    assert_eq!(both.get(0, 0), Some(WHITE));
    assert_eq!(both.get(100, 100), Some(BLACK));
}

#[test]
fn test_dmg_bg_disable_blanks_to_white() {
    let mut vram = vec![0u8; 0x2000];
    solid_tile(&mut vram, 0, 1);
    let mut oam = vec![0u8; 160];
    oam[0..4].copy_from_slice(&[16 + 20, 8 + 30, 1, 0]);
    // LCD on, window on, objects on, BG/window enable clear
    let mut regs = registers(0x80 | 0x20 | 0x10 | 0x02, 0, 0);
    // BGP color 0 is black, which the blanked screen ignores
    regs[7] = 0x1B;

    let snapshot = MemorySnapshot::new()
        .with_region(Region::Vram, &vram)
        .with_region(Region::Oam, &oam)
        .with_region(Region::Regs, &regs);
    let frame = GbAdapter::dmg().build_frame_ir(&snapshot);
    assert!(frame.layers.is_empty());
    assert_eq!(frame.backdrop, Some(WHITE));
    assert!(frame
        .diagnostics
        .contains("LCDC bit 0 clear: background and window blank to white"));

    let image = render(&frame, Some(160), Some(144), &RenderOptions::default());
    assert_eq!(image.get(0, 0), Some(WHITE));
    assert_eq!(image.get(30, 20), Some(BLACK));
}

#[test]
fn test_cgb_bg_disable_keeps_layers() {
    let vram = vec![0u8; 0x4000];
    let snapshot = MemorySnapshot::new()
        .with_region(Region::Vram, &vram)
        .with_region(Region::Regs, &registers(0x90, 0, 0));
    let frame = GbAdapter::cgb().build_frame_ir(&snapshot);
    assert_eq!(frame.layers.len(), 1);
    assert!(frame.diagnostics.contains("lose priority over sprites"));
}
