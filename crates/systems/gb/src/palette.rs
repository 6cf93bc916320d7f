//! DMG shade registers and CGB palette RAM.
//!
//! Tiles are 2bpp, so every palette here repeats its four colors: entry `i`
//! is color `i & 3`.

use ir_core::error::{DecodeError, DecodeResult};
use ir_core::ir::{Palette, PaletteSource};
use ir_core::ppu::palette::{bgr555_to_rgb, PALETTE_SIZE};
use ir_core::system::SystemId;

/// DMG shades: white, light gray, dark gray, black.
const SHADES: [[u8; 3]; 4] = [
    [0xFF, 0xFF, 0xFF],
    [0xAA, 0xAA, 0xAA],
    [0x55, 0x55, 0x55],
    [0x00, 0x00, 0x00],
];

/// DMG screen color while LCDC bit 0 is clear, whatever BGP holds.
pub const BLANK: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// BG then OBJ palette RAM, 8 palettes of 4 BGR555 colors each.
pub const CGB_PALETTE_RAM_SIZE: usize = 128;
pub const CGB_PALETTES_PER_KIND: usize = 8;

fn widen(four: [[u8; 3]; 4]) -> [[u8; 3]; PALETTE_SIZE] {
    std::array::from_fn(|i| four[i & 3])
}

/// Shades selected by a BGP/OBP register.
pub fn dmg_palette(id: &str, register: u8) -> Palette {
    let four = std::array::from_fn(|i| SHADES[((register >> (i * 2)) & 0x03) as usize]);
    Palette::from_rgb(id, SystemId::GameBoy, PaletteSource::Registers, widen(four))
}

/// `BGP`, `OBP0`, `OBP1`.
pub fn dmg_palettes(bgp: u8, obp0: u8, obp1: u8) -> Vec<Palette> {
    vec![
        dmg_palette("BGP", bgp),
        dmg_palette("OBP0", obp0),
        dmg_palette("OBP1", obp1),
    ]
}

/// Decode CGB palette RAM into `BG0`-`BG7` followed by `OBJ0`-`OBJ7`.
pub fn cgb_palettes(palette_ram: &[u8]) -> DecodeResult<Vec<Palette>> {
    if palette_ram.len() != CGB_PALETTE_RAM_SIZE {
        return Err(DecodeError::exact_size(
            "CGB palette RAM",
            CGB_PALETTE_RAM_SIZE,
            palette_ram.len(),
        ));
    }
    if palette_ram.iter().all(|&b| b == 0) {
        return Err(DecodeError::EmptyData {
            region: "CGB palette RAM",
        });
    }

    let palettes = palette_ram
        .chunks_exact(8)
        .enumerate()
        .map(|(n, block)| {
            let four = std::array::from_fn(|c| {
                bgr555_to_rgb(u16::from_le_bytes([block[c * 2], block[c * 2 + 1]]) & 0x7FFF)
            });
            let id = if n < CGB_PALETTES_PER_KIND {
                format!("BG{}", n)
            } else {
                format!("OBJ{}", n - CGB_PALETTES_PER_KIND)
            };
            Palette::from_rgb(id, SystemId::GameBoyColor, PaletteSource::PaletteRam, widen(four))
        })
        .collect();
    Ok(palettes)
}
