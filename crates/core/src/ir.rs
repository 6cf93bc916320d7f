//! The system-agnostic frame intermediate representation.
//!
//! A `FrameIR` is built once from one snapshot and not mutated afterwards.
//! Anything that could not be decoded is absent (empty lists, `None`) and
//! explained in `diagnostics`; nothing is filled in with guesses.

use crate::error::{DecodeError, DecodeResult};
use crate::logging::{log, LogCategory, LogLevel};
use crate::ppu::palette::{parse_hex, to_hex, ResolvedPalette, PALETTE_SIZE};
use crate::system::SystemId;
use crate::types::{Image, Rgba};
use serde::{Deserialize, Serialize};

/// Hardware region a palette was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaletteSource {
    Cram,
    Cgram,
    PaletteRam,
    Registers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub id: String,
    pub system: SystemId,
    pub source: PaletteSource,
    pub colors: [String; PALETTE_SIZE],
}

impl Palette {
    pub fn from_rgb(
        id: impl Into<String>,
        system: SystemId,
        source: PaletteSource,
        rgb: [[u8; 3]; PALETTE_SIZE],
    ) -> Self {
        Self {
            id: id.into(),
            system,
            source,
            colors: rgb.map(to_hex),
        }
    }

    /// Build from already formatted colors; anything but 16 entries is rejected.
    pub fn from_hex(
        id: impl Into<String>,
        system: SystemId,
        source: PaletteSource,
        colors: Vec<String>,
    ) -> DecodeResult<Self> {
        let len = colors.len();
        let colors: [String; PALETTE_SIZE] = colors
            .try_into()
            .map_err(|_| DecodeError::exact_size("palette colors", PALETTE_SIZE, len))?;
        Ok(Self {
            id: id.into(),
            system,
            source,
            colors,
        })
    }

    /// Parse the colors for drawing. Malformed entries resolve to `None`.
    pub fn resolve(&self) -> ResolvedPalette {
        let mut colors = [None; PALETTE_SIZE];
        for (slot, hex) in colors.iter_mut().zip(self.colors.iter()) {
            *slot = parse_hex(hex);
        }
        ResolvedPalette::from_colors(colors)
    }
}

/// One decoded 8x8 tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub id: usize,
    /// Row-major pixel indices, 0 transparent. `None` for preview-only tiles.
    pub indices: Option<Vec<u8>>,
    pub preview: Image,
    pub hash: String,
}

impl Tile {
    /// True iff every pixel index is 0.
    pub fn is_empty(&self) -> bool {
        match &self.indices {
            Some(indices) => indices.iter().all(|&i| i == 0),
            None => self.preview.pixels.chunks_exact(4).all(|px| px[3] == 0),
        }
    }

    #[inline]
    pub fn index_at(&self, width: u32, x: u32, y: u32) -> Option<u8> {
        self.indices
            .as_ref()
            .and_then(|indices| indices.get((y * width + x) as usize).copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl Default for TileSize {
    fn default() -> Self {
        Self {
            width: 8,
            height: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tileset {
    pub tiles: Vec<Tile>,
    pub tile_size: TileSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TilemapCell {
    pub tile_index: u16,
    pub palette: u8,
    pub flip_h: bool,
    pub flip_v: bool,
    pub priority: bool,
}

/// A grid of cells; `cells.len() == width * height` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    cells: Vec<TilemapCell>,
}

impl Tilemap {
    pub fn new(width: u32, height: u32, cells: Vec<TilemapCell>) -> DecodeResult<Self> {
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(DecodeError::exact_size("tilemap cells", expected, cells.len()));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Build a map cell by cell in row-major order.
    pub fn from_fn(width: u32, height: u32, mut cell: impl FnMut(u32, u32) -> TilemapCell) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(cell(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// A map of `width * height` default cells.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![TilemapCell::default(); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cells(&self) -> &[TilemapCell] {
        &self.cells
    }

    #[inline]
    pub fn cell(&self, x: u32, y: u32) -> Option<&TilemapCell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get((y * self.width + x) as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Background,
    Foreground,
    Window,
    Other,
}

/// Layer scroll. Screen pixel (sx, sy) samples plane pixel (sx + x, sy + y).
///
/// `rows` overrides `x` per screen line, `columns` overrides `y` per
/// `column_width`-pixel screen column. Lines or columns past the end of
/// either list fall back to the uniform value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scroll {
    pub x: i32,
    pub y: i32,
    pub rows: Vec<i32>,
    pub columns: Vec<i32>,
    pub column_width: u32,
}

impl Scroll {
    pub fn uniform(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn is_uniform(&self) -> bool {
        self.rows.is_empty() && self.columns.is_empty()
    }

    #[inline]
    pub fn x_for_line(&self, line: u32) -> i32 {
        self.rows.get(line as usize).copied().unwrap_or(self.x)
    }

    #[inline]
    pub fn y_for_column(&self, screen_x: u32) -> i32 {
        if self.column_width == 0 {
            return self.y;
        }
        self.columns
            .get((screen_x / self.column_width) as usize)
            .copied()
            .unwrap_or(self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub name: String,
    pub kind: LayerKind,
    /// Index into `FrameIR::tilesets`.
    pub tileset: usize,
    pub tilemap: Tilemap,
    /// Maps a cell's palette selector to an index into `FrameIR::palettes`.
    pub palette_group: Vec<usize>,
    pub scroll: Scroll,
    /// The map repeats past its edges. A non-wrapping layer is drawn once,
    /// its top-left corner at screen (-scroll.x, -scroll.y).
    pub wrap: bool,
    /// Lower values are composited first.
    pub priority_order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    pub id: usize,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub image: Image,
    pub priority: Option<bool>,
    pub palette_index: Option<u8>,
}

/// Append-only list of decode issues.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diagnostics(Vec<String>);

impl Diagnostics {
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        log(LogCategory::Adapter, LogLevel::Info, || {
            format!("diagnostic: {}", message)
        });
        self.0.push(message);
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.0.iter().any(|d| d.contains(needle))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameIR {
    pub system: SystemId,
    pub palettes: Vec<Palette>,
    pub tilesets: Vec<Tileset>,
    pub layers: Vec<Layer>,
    pub sprites: Vec<Sprite>,
    pub framebuffer: Option<Image>,
    /// Color the canvas starts with, when the hardware exposes one.
    pub backdrop: Option<Rgba>,
    pub diagnostics: Diagnostics,
}

impl FrameIR {
    pub fn new(system: SystemId) -> Self {
        Self {
            system,
            palettes: Vec::new(),
            tilesets: Vec::new(),
            layers: Vec::new(),
            sprites: Vec::new(),
            framebuffer: None,
            backdrop: None,
            diagnostics: Diagnostics::default(),
        }
    }
}
