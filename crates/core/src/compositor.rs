//! Recompose a `FrameIR` into an RGBA image.
//!
//! Draw order:
//! 1. low-priority cells of the selected layers, in ascending `priority_order`
//! 2. sprites, in table order
//! 3. high-priority cells of the selected layers
//!
//! Tiles are colored at draw time with the cell's palette and flipped by
//! resampling; stored tiles are never modified. Index 0 is never drawn.

use crate::ir::{FrameIR, Layer, LayerKind, Tile, TileSize, Tilemap, TilemapCell};
use crate::logging::{log, LogCategory, LogLevel};
use crate::ppu::palette::{IndexedPalette, ResolvedPalette};
use crate::types::Image;

/// Canvas size when neither the caller nor the frame provides one.
pub const DEFAULT_WIDTH: u32 = 320;
pub const DEFAULT_HEIGHT: u32 = 224;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Layers to draw; `None` draws every non-window layer.
    pub layer_indices: Option<Vec<usize>>,
}

impl RenderOptions {
    pub fn layers(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            layer_indices: Some(indices.into_iter().collect()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Low,
    High,
}

impl Pass {
    fn wants(self, cell: &TilemapCell) -> bool {
        cell.priority == (self == Pass::High)
    }
}

/// Counts of cells that could not be drawn, for logging.
#[derive(Debug, Default)]
struct Skipped {
    missing_tiles: usize,
    missing_palettes: usize,
}

/// Per-layer draw state resolved once per render.
struct PreparedLayer<'a> {
    layer: &'a Layer,
    tiles: &'a [Tile],
    tile_size: TileSize,
    palettes: Vec<Option<ResolvedPalette>>,
}

impl<'a> PreparedLayer<'a> {
    fn new(frame: &'a FrameIR, layer: &'a Layer) -> Option<Self> {
        let tileset = frame.tilesets.get(layer.tileset)?;
        let palettes = layer
            .palette_group
            .iter()
            .map(|&slot| frame.palettes.get(slot).map(|p| p.resolve()))
            .collect();
        Some(Self {
            layer,
            tiles: &tileset.tiles,
            tile_size: tileset.tile_size,
            palettes,
        })
    }

    fn palette(&self, selector: u8) -> Option<&ResolvedPalette> {
        self.palettes.get(selector as usize).and_then(|p| p.as_ref())
    }

    fn map_pixels(&self) -> (i32, i32) {
        let map = &self.layer.tilemap;
        (
            (map.width() * self.tile_size.width) as i32,
            (map.height() * self.tile_size.height) as i32,
        )
    }
}

/// Render `frame` to a new image.
///
/// The canvas is `width` x `height` when given, otherwise the captured
/// framebuffer's size, otherwise 320x224. The result depends only on the
/// arguments.
pub fn render(
    frame: &FrameIR,
    width: Option<u32>,
    height: Option<u32>,
    options: &RenderOptions,
) -> Image {
    let (fb_w, fb_h) = frame
        .framebuffer
        .as_ref()
        .map(|fb| (fb.width, fb.height))
        .unwrap_or((DEFAULT_WIDTH, DEFAULT_HEIGHT));
    let mut canvas = Image::new(width.unwrap_or(fb_w), height.unwrap_or(fb_h));
    if let Some(backdrop) = frame.backdrop {
        canvas.fill(backdrop);
    }

    let layers = prepare_layers(frame, options);
    let mut skipped = Skipped::default();

    for layer in &layers {
        draw_layer(&mut canvas, layer, Pass::Low, &mut skipped);
    }
    for sprite in &frame.sprites {
        canvas.blit(&sprite.image, sprite.x, sprite.y);
    }
    for layer in &layers {
        draw_layer(&mut canvas, layer, Pass::High, &mut skipped);
    }

    if skipped.missing_tiles > 0 || skipped.missing_palettes > 0 {
        log(LogCategory::Render, LogLevel::Debug, || {
            format!(
                "skipped {} cell draws with missing tiles, {} with unresolved palettes",
                skipped.missing_tiles, skipped.missing_palettes
            )
        });
    }
    canvas
}

fn prepare_layers<'a>(frame: &'a FrameIR, options: &RenderOptions) -> Vec<PreparedLayer<'a>> {
    let selected: Vec<usize> = match &options.layer_indices {
        Some(indices) => indices.clone(),
        None => frame
            .layers
            .iter()
            .enumerate()
            .filter(|(_, layer)| layer.kind != LayerKind::Window)
            .map(|(i, _)| i)
            .collect(),
    };

    let mut layers: Vec<PreparedLayer<'a>> = Vec::with_capacity(selected.len());
    for index in selected {
        let Some(layer) = frame.layers.get(index) else {
            log(LogCategory::Render, LogLevel::Warn, || {
                format!("layer {} requested but frame has {}", index, frame.layers.len())
            });
            continue;
        };
        match PreparedLayer::new(frame, layer) {
            Some(prepared) => layers.push(prepared),
            None => log(LogCategory::Render, LogLevel::Warn, || {
                format!("layer '{}' references missing tileset {}", layer.name, layer.tileset)
            }),
        }
    }
    layers.sort_by_key(|prepared| prepared.layer.priority_order);
    layers
}

fn draw_layer(canvas: &mut Image, layer: &PreparedLayer<'_>, pass: Pass, skipped: &mut Skipped) {
    let (map_w, map_h) = layer.map_pixels();
    if map_w == 0 || map_h == 0 {
        return;
    }
    if layer.layer.scroll.is_uniform() {
        draw_layer_tiled(canvas, layer, pass, skipped);
    } else {
        draw_layer_sampled(canvas, layer, pass, skipped);
    }
}

/// Uniform scroll: place every cell, repeating the map around the viewport.
fn draw_layer_tiled(
    canvas: &mut Image,
    layer: &PreparedLayer<'_>,
    pass: Pass,
    skipped: &mut Skipped,
) {
    let (map_w, map_h) = layer.map_pixels();
    let TileSize {
        width: tw,
        height: th,
    } = layer.tile_size;
    let scroll = &layer.layer.scroll;
    let (view_w, view_h) = (canvas.width as i32, canvas.height as i32);
    let map: &Tilemap = &layer.layer.tilemap;
    // 3x3 copies when the map is at least as large as the viewport, more otherwise
    let (origin_x, origin_y, copies_x, copies_y) = if layer.layer.wrap {
        (
            scroll.x.rem_euclid(map_w),
            scroll.y.rem_euclid(map_h),
            -1..=view_w / map_w + 1,
            -1..=view_h / map_h + 1,
        )
    } else {
        (scroll.x, scroll.y, 0..=0, 0..=0)
    };

    for ty in 0..map.height() {
        for tx in 0..map.width() {
            let Some(cell) = map.cell(tx, ty) else {
                continue;
            };
            if !pass.wants(cell) {
                continue;
            }
            let Some(tile) = layer.tiles.get(cell.tile_index as usize) else {
                skipped.missing_tiles += 1;
                continue;
            };
            let palette = layer.palette(cell.palette);
            if tile.indices.is_some() && palette.is_none() {
                skipped.missing_palettes += 1;
                continue;
            }

            let base_x = (tx * tw) as i32 - origin_x;
            let base_y = (ty * th) as i32 - origin_y;
            for wrap_y in copies_y.clone() {
                for wrap_x in copies_x.clone() {
                    let dx = base_x + wrap_x * map_w;
                    let dy = base_y + wrap_y * map_h;
                    if dx + tw as i32 <= 0 || dy + th as i32 <= 0 || dx >= view_w || dy >= view_h
                    {
                        continue;
                    }
                    draw_tile(canvas, tile, layer.tile_size, cell, palette, dx, dy);
                }
            }
        }
    }
}

fn draw_tile(
    canvas: &mut Image,
    tile: &Tile,
    size: TileSize,
    cell: &TilemapCell,
    palette: Option<&ResolvedPalette>,
    dx: i32,
    dy: i32,
) {
    for y in 0..size.height {
        for x in 0..size.width {
            let sx = if cell.flip_h { size.width - 1 - x } else { x };
            let sy = if cell.flip_v { size.height - 1 - y } else { y };
            if let Some(color) = tile_pixel(tile, size, palette, sx, sy) {
                canvas.put(dx + x as i32, dy + y as i32, color);
            }
        }
    }
}

/// Color of a tile pixel, or `None` when it is transparent.
#[inline]
fn tile_pixel(
    tile: &Tile,
    size: TileSize,
    palette: Option<&ResolvedPalette>,
    x: u32,
    y: u32,
) -> Option<[u8; 4]> {
    match (tile.index_at(size.width, x, y), palette) {
        (Some(index), Some(palette)) => palette.color(index & 0x0F),
        (Some(_), None) => None,
        (None, _) => tile.preview.get(x, y).filter(|px| px[3] != 0),
    }
}

/// Per-line or per-column scroll: sample the plane once per screen pixel.
fn draw_layer_sampled(
    canvas: &mut Image,
    layer: &PreparedLayer<'_>,
    pass: Pass,
    skipped: &mut Skipped,
) {
    let (map_w, map_h) = layer.map_pixels();
    let size = layer.tile_size;
    let scroll = &layer.layer.scroll;
    let map = &layer.layer.tilemap;

    for sy in 0..canvas.height {
        let line_x = scroll.x_for_line(sy);
        for sx in 0..canvas.width {
            let px = sx as i32 + line_x;
            let py = sy as i32 + scroll.y_for_column(sx);
            let (px, py) = if layer.layer.wrap {
                (px.rem_euclid(map_w) as u32, py.rem_euclid(map_h) as u32)
            } else if (0..map_w).contains(&px) && (0..map_h).contains(&py) {
                (px as u32, py as u32)
            } else {
                continue;
            };
            let Some(cell) = map.cell(px / size.width, py / size.height) else {
                continue;
            };
            if !pass.wants(cell) {
                continue;
            }
            let Some(tile) = layer.tiles.get(cell.tile_index as usize) else {
                skipped.missing_tiles += 1;
                continue;
            };
            let palette = layer.palette(cell.palette);
            if tile.indices.is_some() && palette.is_none() {
                skipped.missing_palettes += 1;
                continue;
            }
            let mut x = px % size.width;
            let mut y = py % size.height;
            if cell.flip_h {
                x = size.width - 1 - x;
            }
            if cell.flip_v {
                y = size.height - 1 - y;
            }
            if let Some(color) = tile_pixel(tile, size, palette, x, y) {
                canvas.put(sx as i32, sy as i32, color);
            }
        }
    }
}
