//! Core primitives for decoding captured video memory into a frame IR.

pub mod compositor;
pub mod error;
pub mod export;
pub mod ir;
pub mod logging;
pub mod ppu;
pub mod snapshot;
pub mod system;
pub mod validator;

pub mod types {
    use crate::error::{DecodeError, DecodeResult};

    /// An RGBA8 color.
    pub type Rgba = [u8; 4];

    pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

    /// An owned RGBA8 image, row-major.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Image {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u8>,
    }

    impl Image {
        /// Create a fully transparent image.
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![0; width as usize * height as usize * 4],
            }
        }

        pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> DecodeResult<Self> {
            let expected = width as usize * height as usize * 4;
            if pixels.len() != expected {
                return Err(DecodeError::exact_size("image", expected, pixels.len()));
            }
            Ok(Self {
                width,
                height,
                pixels,
            })
        }

        pub fn is_empty(&self) -> bool {
            self.width == 0 || self.height == 0
        }

        #[inline]
        fn offset(&self, x: u32, y: u32) -> usize {
            (y as usize * self.width as usize + x as usize) * 4
        }

        /// Pixel at (x, y), or `None` outside the image.
        #[inline]
        pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
            if x >= self.width || y >= self.height {
                return None;
            }
            let o = self.offset(x, y);
            Some([
                self.pixels[o],
                self.pixels[o + 1],
                self.pixels[o + 2],
                self.pixels[o + 3],
            ])
        }

        /// Write a pixel; coordinates outside the image are ignored.
        #[inline]
        pub fn put(&mut self, x: i32, y: i32, color: Rgba) {
            if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
                return;
            }
            let o = self.offset(x as u32, y as u32);
            self.pixels[o..o + 4].copy_from_slice(&color);
        }

        pub fn fill(&mut self, color: Rgba) {
            for px in self.pixels.chunks_exact_mut(4) {
                px.copy_from_slice(&color);
            }
        }

        /// Copy `src` onto this image at (dx, dy), skipping transparent source pixels.
        pub fn blit(&mut self, src: &Image, dx: i32, dy: i32) {
            for sy in 0..src.height {
                for sx in 0..src.width {
                    let o = src.offset(sx, sy);
                    if src.pixels[o + 3] == 0 {
                        continue;
                    }
                    let color = [
                        src.pixels[o],
                        src.pixels[o + 1],
                        src.pixels[o + 2],
                        src.pixels[o + 3],
                    ];
                    self.put(dx + sx as i32, dy + sy as i32, color);
                }
            }
        }
    }
}

use ir::FrameIR;
use snapshot::MemorySnapshot;
use system::SystemId;

/// Per-system assembly of a `FrameIR` from one memory snapshot.
///
/// Implementations never fail on missing regions: whatever cannot be decoded
/// is left empty and explained in `FrameIR::diagnostics`.
pub trait Adapter {
    fn system(&self) -> SystemId;

    fn build_frame_ir(&self, snapshot: &MemorySnapshot) -> FrameIR;

    /// Names of the snapshot regions this system reads.
    fn regions(&self) -> &'static [snapshot::Region];
}
