//! CRAM decoding.
//!
//! 64 colors as 4 palette lines of 16. Each color is a 16-bit word
//! `0000 BBB0 GGG0 RRR0`, read little-endian from the snapshot.

use ir_core::error::{DecodeError, DecodeResult};
use ir_core::ir::{Palette, PaletteSource};
use ir_core::logging::{log, LogCategory, LogLevel};
use ir_core::ppu::palette::{expand_channel, PALETTE_SIZE};
use ir_core::system::SystemId;

pub const CRAM_SIZE: usize = 128;
pub const PALETTE_COUNT: usize = 4;

/// 9-bit color word to 8-bit RGB.
pub fn decode_color(word: u16) -> [u8; 3] {
    let r = ((word >> 1) & 0x07) as u8;
    let g = ((word >> 5) & 0x07) as u8;
    let b = ((word >> 9) & 0x07) as u8;
    [expand_channel(r, 3), expand_channel(g, 3), expand_channel(b, 3)]
}

/// Decode all four palette lines.
///
/// Fails with `InvalidInputSize` unless `cram` is exactly 128 bytes and with
/// `EmptyData` when every color word is zero.
pub fn decode(cram: &[u8]) -> DecodeResult<Vec<Palette>> {
    if cram.len() != CRAM_SIZE {
        return Err(DecodeError::exact_size("CRAM", CRAM_SIZE, cram.len()));
    }

    let words: Vec<u16> = cram
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    if words.iter().all(|&w| w == 0) {
        return Err(DecodeError::EmptyData { region: "CRAM" });
    }

    let palettes: Vec<Palette> = words
        .chunks_exact(PALETTE_SIZE)
        .enumerate()
        .map(|(line, colors)| {
            let mut rgb = [[0u8; 3]; PALETTE_SIZE];
            for (slot, &word) in rgb.iter_mut().zip(colors) {
                *slot = decode_color(word);
            }
            Palette::from_rgb(
                format!("PAL{}", line),
                SystemId::MegaDrive,
                PaletteSource::Cram,
                rgb,
            )
        })
        .collect();

    log(LogCategory::Palette, LogLevel::Debug, || {
        format!("decoded {} CRAM palette lines", palettes.len())
    });
    Ok(palettes)
}
