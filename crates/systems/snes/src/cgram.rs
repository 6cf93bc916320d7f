//! CGRAM decoding: 256 BGR555 colors as 16 palettes of 16.

use ir_core::error::{DecodeError, DecodeResult};
use ir_core::ir::{Palette, PaletteSource};
use ir_core::logging::{log, LogCategory, LogLevel};
use ir_core::ppu::palette::{bgr555_to_rgb, PALETTE_SIZE};
use ir_core::system::SystemId;

pub const CGRAM_SIZE: usize = 512;
pub const PALETTE_COUNT: usize = 16;

pub fn decode(cgram: &[u8]) -> DecodeResult<Vec<Palette>> {
    if cgram.len() != CGRAM_SIZE {
        return Err(DecodeError::exact_size("CGRAM", CGRAM_SIZE, cgram.len()));
    }
    if cgram.iter().all(|&b| b == 0) {
        return Err(DecodeError::EmptyData { region: "CGRAM" });
    }

    let palettes: Vec<Palette> = cgram
        .chunks_exact(PALETTE_SIZE * 2)
        .enumerate()
        .map(|(n, line)| {
            let mut rgb = [[0u8; 3]; PALETTE_SIZE];
            for (slot, pair) in rgb.iter_mut().zip(line.chunks_exact(2)) {
                // Bit 15 is unused
                *slot = bgr555_to_rgb(u16::from_le_bytes([pair[0], pair[1]]) & 0x7FFF);
            }
            Palette::from_rgb(format!("CG{}", n), SystemId::Snes, PaletteSource::Cgram, rgb)
        })
        .collect();

    log(LogCategory::Palette, LogLevel::Debug, || {
        format!("decoded {} CGRAM palettes", palettes.len())
    });
    Ok(palettes)
}
