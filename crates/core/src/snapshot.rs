//! Memory snapshots: named byte regions copied out of a running emulator.
//!
//! Every region is an owned buffer. Builders take borrowed slices and copy
//! them, so nothing here aliases emulator memory that the next emulation
//! step could overwrite.

use crate::error::{DecodeError, DecodeResult};
use crate::types::Image;

/// Named regions a snapshot may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Pattern / tile RAM (also holds tilemaps on most systems)
    Vram,
    /// Color RAM
    Cram,
    /// Vertical scroll RAM
    Vsram,
    /// Sprite attribute table
    Sat,
    /// Object attribute memory
    Oam,
    /// Palette RAM when a system keeps it outside CRAM
    Palettes,
    /// Video controller register block
    Regs,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::Vram,
        Region::Cram,
        Region::Vsram,
        Region::Sat,
        Region::Oam,
        Region::Palettes,
        Region::Regs,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Region::Vram => "vram",
            Region::Cram => "cram",
            Region::Vsram => "vsram",
            Region::Sat => "sat",
            Region::Oam => "oam",
            Region::Palettes => "palettes",
            Region::Regs => "regs",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub framebuffer: Option<Vec<u8>>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub vram: Option<Vec<u8>>,
    pub cram: Option<Vec<u8>>,
    pub vsram: Option<Vec<u8>>,
    pub sat: Option<Vec<u8>>,
    pub oam: Option<Vec<u8>>,
    pub palettes: Option<Vec<u8>>,
    pub regs: Option<Vec<u8>>,
}

impl MemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `bytes` into the named region.
    pub fn with_region(mut self, region: Region, bytes: &[u8]) -> Self {
        *self.slot_mut(region) = Some(bytes.to_vec());
        self
    }

    /// Copy an RGBA8 framebuffer of the given size.
    pub fn with_framebuffer(mut self, rgba: &[u8], width: u32, height: u32) -> Self {
        self.framebuffer = Some(rgba.to_vec());
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn region(&self, region: Region) -> Option<&[u8]> {
        match region {
            Region::Vram => self.vram.as_deref(),
            Region::Cram => self.cram.as_deref(),
            Region::Vsram => self.vsram.as_deref(),
            Region::Sat => self.sat.as_deref(),
            Region::Oam => self.oam.as_deref(),
            Region::Palettes => self.palettes.as_deref(),
            Region::Regs => self.regs.as_deref(),
        }
    }

    fn slot_mut(&mut self, region: Region) -> &mut Option<Vec<u8>> {
        match region {
            Region::Vram => &mut self.vram,
            Region::Cram => &mut self.cram,
            Region::Vsram => &mut self.vsram,
            Region::Sat => &mut self.sat,
            Region::Oam => &mut self.oam,
            Region::Palettes => &mut self.palettes,
            Region::Regs => &mut self.regs,
        }
    }

    /// The captured framebuffer as an image.
    ///
    /// `Ok(None)` when the buffer or either dimension is missing. Extra bytes
    /// past `width * height * 4` are ignored; too few is an error.
    pub fn framebuffer_image(&self) -> DecodeResult<Option<Image>> {
        let (Some(pixels), Some(width), Some(height)) =
            (self.framebuffer.as_ref(), self.width, self.height)
        else {
            return Ok(None);
        };
        let needed = width as usize * height as usize * 4;
        if pixels.len() < needed {
            return Err(DecodeError::min_size("framebuffer", needed, pixels.len()));
        }
        Image::from_rgba(width, height, pixels[..needed].to_vec()).map(Some)
    }
}
