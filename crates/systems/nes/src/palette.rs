//! Palette RAM decoding through the 2C02 master palette.
//!
//! Palette RAM holds 32 six-bit master palette indices: four 4-color
//! background palettes followed by four sprite palettes.

use ir_core::error::{DecodeError, DecodeResult};
use ir_core::ir::{Palette, PaletteSource};
use ir_core::logging::{log, LogCategory, LogLevel};
use ir_core::ppu::palette::PALETTE_SIZE;
use ir_core::system::SystemId;

pub const PALETTE_RAM_SIZE: usize = 32;

/// 2C02 master palette, RGB.
const MASTER_PALETTE: [[u8; 3]; 64] = [
    [0x54, 0x54, 0x54], [0x00, 0x1E, 0x74], [0x08, 0x10, 0x90], [0x30, 0x00, 0x88],
    [0x44, 0x00, 0x64], [0x5C, 0x00, 0x30], [0x54, 0x04, 0x00], [0x3C, 0x18, 0x00],
    [0x20, 0x2A, 0x00], [0x08, 0x3A, 0x00], [0x00, 0x40, 0x00], [0x00, 0x3C, 0x00],
    [0x00, 0x32, 0x3C], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00],
    [0x98, 0x96, 0x98], [0x08, 0x4C, 0xC4], [0x30, 0x32, 0xEC], [0x5C, 0x1E, 0xE4],
    [0x88, 0x14, 0xB0], [0xA0, 0x14, 0x64], [0x98, 0x22, 0x20], [0x78, 0x3C, 0x00],
    [0x54, 0x5A, 0x00], [0x28, 0x72, 0x00], [0x08, 0x7C, 0x00], [0x00, 0x76, 0x28],
    [0x00, 0x66, 0x78], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00],
    [0xEC, 0xEE, 0xEC], [0x4C, 0x9A, 0xEC], [0x78, 0x7C, 0xEC], [0xB0, 0x62, 0xEC],
    [0xE4, 0x54, 0xEC], [0xEC, 0x58, 0xB4], [0xEC, 0x6A, 0x64], [0xD4, 0x88, 0x20],
    [0xA0, 0xAA, 0x00], [0x74, 0xC4, 0x00], [0x4C, 0xD0, 0x20], [0x38, 0xCC, 0x6C],
    [0x38, 0xB4, 0xCC], [0x3C, 0x3C, 0x3C], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00],
    [0xEC, 0xEE, 0xEC], [0xA8, 0xCC, 0xEC], [0xBC, 0xBC, 0xEC], [0xD4, 0xB2, 0xEC],
    [0xEC, 0xAE, 0xEC], [0xEC, 0xAE, 0xD4], [0xEC, 0xC4, 0xB0], [0xE4, 0xD4, 0xA0],
    [0xCC, 0xDC, 0xA0], [0xB4, 0xE4, 0xA0], [0xA8, 0xE4, 0xB4], [0xA0, 0xE4, 0xCC],
    [0xA0, 0xD4, 0xE4], [0xA0, 0xA2, 0xA0], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00],
];

pub fn master_color(index: u8) -> [u8; 3] {
    MASTER_PALETTE[(index & 0x3F) as usize]
}

/// Sprite color 0 entries ($3F10/$3F14/$3F18/$3F1C) mirror the background ones.
pub fn mirror_index(i: usize) -> usize {
    match i & 0x1F {
        0x10 => 0x00,
        0x14 => 0x04,
        0x18 => 0x08,
        0x1C => 0x0C,
        v => v,
    }
}

/// Decode palette RAM into a `BG` and an `OBJ` palette.
///
/// Entry `4 * p + i` of each is color `i` of sub-palette `p`.
pub fn decode(palette_ram: &[u8]) -> DecodeResult<Vec<Palette>> {
    if palette_ram.len() != PALETTE_RAM_SIZE {
        return Err(DecodeError::exact_size(
            "palette RAM",
            PALETTE_RAM_SIZE,
            palette_ram.len(),
        ));
    }
    if palette_ram.iter().all(|&b| b == 0) {
        return Err(DecodeError::EmptyData {
            region: "palette RAM",
        });
    }

    let palettes: Vec<Palette> = [("BG", 0x00), ("OBJ", 0x10)]
        .into_iter()
        .map(|(id, base)| {
            let mut rgb = [[0u8; 3]; PALETTE_SIZE];
            for (i, slot) in rgb.iter_mut().enumerate() {
                *slot = master_color(palette_ram[mirror_index(base + i)]);
            }
            Palette::from_rgb(id, SystemId::Nes, PaletteSource::PaletteRam, rgb)
        })
        .collect();

    log(LogCategory::Palette, LogLevel::Debug, || {
        format!("backdrop master index 0x{:02X}", palette_ram[0] & 0x3F)
    });
    Ok(palettes)
}
