//! Tile/pattern decoding for tile-based video systems.
//!
//! Every system handled here stores 8x8 tiles as bitplanes; they differ in
//! plane count and in how the planes are interleaved.
//!
//! # Tile Formats
//!
//! - **NES (2bpp planar)**: Two bitplanes stored sequentially
//! - **Game Boy (2bpp planar)**: Two bitplanes interleaved per row
//! - **SNES (4bpp planar)**: Planes 0/1 interleaved, then planes 2/3 interleaved
//! - **Mega Drive pattern RAM (4bpp planar)**: Four 8-byte planes stored sequentially

use crate::ir::Tile;
use crate::ppu::palette::{IndexedPalette, ResolvedPalette};
use crate::types::{Image, Rgba, TRANSPARENT};
use sha2::{Digest, Sha256};

/// Tile width and height in pixels.
pub const TILE_DIM: u32 = 8;
/// Pixels per tile.
pub const TILE_PIXELS: usize = 64;

/// Bitplane layouts the decoders understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileFormat {
    /// NES/Famicom: 16 bytes, 8 bytes low plane then 8 bytes high plane.
    Nes2Bpp,

    /// Game Boy: 16 bytes with the two planes interleaved (2 bytes per row).
    GameBoy2Bpp,

    /// SNES: 32 bytes. Rows of planes 0/1 interleaved, then rows of planes 2/3.
    Snes4Bpp,

    /// Mega Drive pattern RAM: 32 bytes as four sequential 8-byte bitplanes.
    MegaDrive4Bpp,
}

/// Trait for decoding tile data into pixel indices.
pub trait TileDecoder {
    /// Decode a single pixel from a tile.
    ///
    /// Returns the palette index for the pixel at column `x`, row `y`
    /// (0-3 for 2bpp, 0-15 for 4bpp). Out-of-range coordinates or short
    /// tile data decode as 0.
    fn decode_pixel(&self, tile_data: &[u8], x: u8, y: u8) -> u8;

    /// Get the size of a single tile in bytes.
    fn tile_size(&self) -> usize;
}

#[inline]
fn plane_bit(byte: u8, x: u8) -> u8 {
    (byte >> (7 - x)) & 1
}

/// NES/Famicom 2bpp planar tile decoder.
#[derive(Debug, Clone, Copy)]
pub struct Nes2BppDecoder;

impl TileDecoder for Nes2BppDecoder {
    fn decode_pixel(&self, tile_data: &[u8], x: u8, y: u8) -> u8 {
        if tile_data.len() < 16 || x > 7 || y > 7 {
            return 0;
        }
        let lo = tile_data[y as usize];
        let hi = tile_data[y as usize + 8];
        (plane_bit(hi, x) << 1) | plane_bit(lo, x)
    }

    fn tile_size(&self) -> usize {
        16
    }
}

/// Game Boy 2bpp planar tile decoder.
#[derive(Debug, Clone, Copy)]
pub struct GameBoy2BppDecoder;

impl TileDecoder for GameBoy2BppDecoder {
    fn decode_pixel(&self, tile_data: &[u8], x: u8, y: u8) -> u8 {
        if tile_data.len() < 16 || x > 7 || y > 7 {
            return 0;
        }
        let row = y as usize * 2;
        (plane_bit(tile_data[row + 1], x) << 1) | plane_bit(tile_data[row], x)
    }

    fn tile_size(&self) -> usize {
        16
    }
}

/// SNES 4bpp planar tile decoder.
#[derive(Debug, Clone, Copy)]
pub struct Snes4BppDecoder;

impl TileDecoder for Snes4BppDecoder {
    fn decode_pixel(&self, tile_data: &[u8], x: u8, y: u8) -> u8 {
        if tile_data.len() < 32 || x > 7 || y > 7 {
            return 0;
        }
        let row = y as usize * 2;
        let p0 = plane_bit(tile_data[row], x);
        let p1 = plane_bit(tile_data[row + 1], x);
        let p2 = plane_bit(tile_data[16 + row], x);
        let p3 = plane_bit(tile_data[16 + row + 1], x);
        (p3 << 3) | (p2 << 2) | (p1 << 1) | p0
    }

    fn tile_size(&self) -> usize {
        32
    }
}

/// Mega Drive pattern RAM decoder: plane `k` row `y` lives at byte `k * 8 + y`.
#[derive(Debug, Clone, Copy)]
pub struct MegaDrive4BppDecoder;

impl TileDecoder for MegaDrive4BppDecoder {
    fn decode_pixel(&self, tile_data: &[u8], x: u8, y: u8) -> u8 {
        if tile_data.len() < 32 || x > 7 || y > 7 {
            return 0;
        }
        let row = y as usize;
        let p0 = plane_bit(tile_data[row], x);
        let p1 = plane_bit(tile_data[8 + row], x);
        let p2 = plane_bit(tile_data[16 + row], x);
        let p3 = plane_bit(tile_data[24 + row], x);
        (p3 << 3) | (p2 << 2) | (p1 << 1) | p0
    }

    fn tile_size(&self) -> usize {
        32
    }
}

/// Get a tile decoder for the specified format.
pub fn get_decoder(format: TileFormat) -> Box<dyn TileDecoder> {
    match format {
        TileFormat::Nes2Bpp => Box::new(Nes2BppDecoder),
        TileFormat::GameBoy2Bpp => Box::new(GameBoy2BppDecoder),
        TileFormat::Snes4Bpp => Box::new(Snes4BppDecoder),
        TileFormat::MegaDrive4Bpp => Box::new(MegaDrive4BppDecoder),
    }
}

/// Decode one tile into its 64 row-major pixel indices.
pub fn decode_indices(decoder: &dyn TileDecoder, tile_data: &[u8]) -> Vec<u8> {
    let mut indices = Vec::with_capacity(TILE_PIXELS);
    for y in 0..TILE_DIM as u8 {
        for x in 0..TILE_DIM as u8 {
            indices.push(decoder.decode_pixel(tile_data, x, y));
        }
    }
    indices
}

/// SHA-256 hex digest of a tile's index matrix.
pub fn content_hash(indices: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(indices);
    format!("{:x}", hasher.finalize())
}

/// Color an index matrix with `palette`; index 0 stays transparent.
pub fn preview_image(indices: &[u8], palette: &dyn IndexedPalette) -> Image {
    let mut image = Image::new(TILE_DIM, TILE_DIM);
    for (i, &index) in indices.iter().enumerate().take(TILE_PIXELS) {
        let color = palette.color(index).unwrap_or(TRANSPARENT);
        image.put(i as i32 % TILE_DIM as i32, i as i32 / TILE_DIM as i32, color);
    }
    image
}

/// Draw one index matrix into `image` at (`dx`, `dy`), mirrored as requested.
///
/// `color` maps a pixel index to its color; indices it maps to `None` are
/// left untouched.
pub fn blit_indices(
    image: &mut Image,
    indices: &[u8],
    dx: u32,
    dy: u32,
    flip_h: bool,
    flip_v: bool,
    color: impl Fn(u8) -> Option<Rgba>,
) {
    for py in 0..TILE_DIM {
        for px in 0..TILE_DIM {
            let sx = if flip_h { TILE_DIM - 1 - px } else { px };
            let sy = if flip_v { TILE_DIM - 1 - py } else { py };
            let Some(&index) = indices.get((sy * TILE_DIM + sx) as usize) else {
                continue;
            };
            if let Some(rgba) = color(index) {
                image.put((dx + px) as i32, (dy + py) as i32, rgba);
            }
        }
    }
}

/// Decode up to `count` consecutive tiles starting at `start_offset`.
///
/// Stops early at the end of `data`; a trailing partial tile is not decoded.
/// Tile ids are sequential from 0 relative to `start_offset`.
pub fn decode_tiles(
    format: TileFormat,
    data: &[u8],
    start_offset: usize,
    count: usize,
    preview: &ResolvedPalette,
) -> Vec<Tile> {
    let decoder = get_decoder(format);
    let size = decoder.tile_size();
    let available = data.len().saturating_sub(start_offset) / size;

    (0..count.min(available))
        .map(|id| {
            let start = start_offset + id * size;
            let indices = decode_indices(decoder.as_ref(), &data[start..start + size]);
            Tile {
                id,
                preview: preview_image(&indices, preview),
                hash: content_hash(&indices),
                indices: Some(indices),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nes_decoder_checkerboard() {
        let mut tile_data = vec![0u8; 16];
        for row in 0..8 {
            tile_data[row] = if row % 2 == 0 { 0b10101010 } else { 0b01010101 };
        }
        // High plane: solid in top half
        for row in 0..4 {
            tile_data[8 + row] = 0xFF;
        }

        let decoder = Nes2BppDecoder;
        assert_eq!(decoder.decode_pixel(&tile_data, 0, 0), 3);
        assert_eq!(decoder.decode_pixel(&tile_data, 1, 0), 2);
        assert_eq!(decoder.decode_pixel(&tile_data, 0, 4), 1);
        assert_eq!(decoder.decode_pixel(&tile_data, 1, 4), 0);
    }

    #[test]
    fn test_decoder_out_of_bounds() {
        let tile_data = vec![0xFFu8; 32];
        for format in [
            TileFormat::Nes2Bpp,
            TileFormat::GameBoy2Bpp,
            TileFormat::Snes4Bpp,
            TileFormat::MegaDrive4Bpp,
        ] {
            let decoder = get_decoder(format);
            assert_eq!(decoder.decode_pixel(&tile_data, 8, 0), 0);
            assert_eq!(decoder.decode_pixel(&tile_data, 0, 8), 0);
            assert_eq!(decoder.decode_pixel(&tile_data[..4], 0, 0), 0);
        }
    }

    #[test]
    fn test_gameboy_decoder_interleaved() {
        let mut tile_data = vec![0u8; 16];
        tile_data[0] = 0b10101010;
        tile_data[1] = 0b11111111;
        tile_data[2] = 0b01010101;

        let decoder = GameBoy2BppDecoder;
        assert_eq!(decoder.decode_pixel(&tile_data, 0, 0), 3);
        assert_eq!(decoder.decode_pixel(&tile_data, 1, 0), 2);
        assert_eq!(decoder.decode_pixel(&tile_data, 0, 1), 0);
        assert_eq!(decoder.decode_pixel(&tile_data, 1, 1), 1);
    }

    #[test]
    fn test_snes_decoder_plane_layout() {
        let mut tile_data = vec![0u8; 32];
        tile_data[0] = 0x80; // row 0 plane 0
        tile_data[17] = 0x80; // row 0 plane 3
        tile_data[3] = 0x01; // row 1 plane 1
        let decoder = Snes4BppDecoder;
        assert_eq!(decoder.decode_pixel(&tile_data, 0, 0), 0b1001);
        assert_eq!(decoder.decode_pixel(&tile_data, 7, 1), 0b0010);
    }

    #[test]
    fn test_megadrive_plane_zero_row() {
        let mut tile_data = vec![0u8; 32];
        tile_data[0] = 0xFF;
        let indices = decode_indices(&MegaDrive4BppDecoder, &tile_data);
        assert_eq!(&indices[0..8], &[1, 1, 1, 1, 1, 1, 1, 1]);
        assert!(indices[8..].iter().all(|&i| i == 0));
    }

    #[test]
    fn test_megadrive_all_planes() {
        let mut tile_data = vec![0u8; 32];
        tile_data[2] = 0x01; // plane 0, row 2, column 7
        tile_data[8 + 2] = 0x01;
        tile_data[16 + 2] = 0x01;
        tile_data[24 + 2] = 0x01;
        let decoder = MegaDrive4BppDecoder;
        assert_eq!(decoder.decode_pixel(&tile_data, 7, 2), 15);
        assert_eq!(decoder.decode_pixel(&tile_data, 6, 2), 0);
    }

    #[test]
    fn test_decode_tiles_stops_at_end() {
        let data = vec![0u8; 32 * 3 + 10];
        let tiles = decode_tiles(
            TileFormat::MegaDrive4Bpp,
            &data,
            32,
            100,
            &ResolvedPalette::grayscale(),
        );
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[1].id, 1);
        assert_eq!(tiles[0].hash, tiles[1].hash);
    }

    #[test]
    fn test_preview_transparent_index_zero() {
        let mut indices = vec![0u8; TILE_PIXELS];
        indices[9] = 15;
        let image = preview_image(&indices, &ResolvedPalette::grayscale());
        assert_eq!(image.get(0, 0), Some(TRANSPARENT));
        assert_eq!(image.get(1, 1), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_content_hash_distinguishes_tiles() {
        let a = vec![0u8; TILE_PIXELS];
        let mut b = a.clone();
        b[63] = 1;
        assert_ne!(content_hash(&a), content_hash(&b));
        assert_eq!(content_hash(&a).len(), 64);
    }

    #[test]
    fn test_blit_indices_flips() {
        let mut indices = vec![0u8; TILE_PIXELS];
        indices[0] = 1; // top-left
        let red = [255, 0, 0, 255];
        let color = |i: u8| if i == 0 { None } else { Some(red) };

        let mut image = Image::new(16, 8);
        blit_indices(&mut image, &indices, 8, 0, true, true, color);
        assert_eq!(image.get(15, 7), Some(red));
        assert_eq!(image.get(8, 0), Some(TRANSPARENT));
    }
}
