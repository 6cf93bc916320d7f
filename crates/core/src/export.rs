//! Persisted artifacts: packed spritesheets and frame metadata.

use crate::ir::{FrameIR, LayerKind, Sprite, TileSize};
use crate::system::SystemId;
use crate::types::Image;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpritesheetOptions {
    /// Sprites per row
    pub columns: usize,
    /// Gap in pixels between neighbouring sprites
    pub spacing: u32,
}

impl Default for SpritesheetOptions {
    fn default() -> Self {
        Self {
            columns: 8,
            spacing: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteRect {
    pub id: usize,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpritesheetMetadata {
    pub sprites: Vec<SpriteRect>,
    pub image_width: u32,
    pub image_height: u32,
}

/// Pack sprites into a grid, `columns` per row, each row as tall as its tallest sprite.
///
/// No sprites yields a 0x0 image with an empty list.
pub fn pack_spritesheet(sprites: &[Sprite], options: &SpritesheetOptions) -> (Image, SpritesheetMetadata) {
    let columns = options.columns.max(1);
    let spacing = options.spacing;

    let mut rects = Vec::with_capacity(sprites.len());
    let mut sheet_w = 0u32;
    let mut y = 0u32;
    for row in sprites.chunks(columns) {
        let mut x = 0u32;
        let row_h = row.iter().map(|s| s.image.height).max().unwrap_or(0);
        for sprite in row {
            rects.push(SpriteRect {
                id: sprite.id,
                x,
                y,
                w: sprite.image.width,
                h: sprite.image.height,
            });
            x += sprite.image.width + spacing;
        }
        sheet_w = sheet_w.max(x.saturating_sub(spacing));
        y += row_h + spacing;
    }
    let sheet_h = y.saturating_sub(spacing);

    let mut image = Image::new(sheet_w, sheet_h);
    for (sprite, rect) in sprites.iter().zip(&rects) {
        image.blit(&sprite.image, rect.x as i32, rect.y as i32);
    }

    let metadata = SpritesheetMetadata {
        sprites: rects,
        image_width: sheet_w,
        image_height: sheet_h,
    };
    (image, metadata)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteMetadata {
    pub id: String,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilesetMetadata {
    pub tile_count: usize,
    pub tile_size: TileSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMetadata {
    pub kind: LayerKind,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteMetadata {
    pub id: usize,
    pub w: u32,
    pub h: u32,
    pub x: i32,
    pub y: i32,
    pub palette_index: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameMetadata {
    pub system: SystemId,
    pub palettes: Vec<PaletteMetadata>,
    pub tilesets: Vec<TilesetMetadata>,
    pub layers: Vec<LayerMetadata>,
    pub sprites: Vec<SpriteMetadata>,
}

/// Summarize a frame; layer sizes are in tiles.
pub fn frame_metadata(frame: &FrameIR) -> FrameMetadata {
    FrameMetadata {
        system: frame.system,
        palettes: frame
            .palettes
            .iter()
            .map(|p| PaletteMetadata {
                id: p.id.clone(),
                colors: p.colors.to_vec(),
            })
            .collect(),
        tilesets: frame
            .tilesets
            .iter()
            .map(|t| TilesetMetadata {
                tile_count: t.tiles.len(),
                tile_size: t.tile_size,
            })
            .collect(),
        layers: frame
            .layers
            .iter()
            .map(|l| LayerMetadata {
                kind: l.kind,
                width: l.tilemap.width(),
                height: l.tilemap.height(),
            })
            .collect(),
        sprites: frame
            .sprites
            .iter()
            .map(|s| SpriteMetadata {
                id: s.id,
                w: s.width,
                h: s.height,
                x: s.x,
                y: s.y,
                palette_index: s.palette_index,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Layer, Palette, PaletteSource, Scroll, Tilemap, Tileset};

    fn sprite(id: usize, w: u32, h: u32) -> Sprite {
        let mut image = Image::new(w, h);
        image.fill([id as u8, 0, 0, 255]);
        Sprite {
            id,
            x: 0,
            y: 0,
            width: w,
            height: h,
            image,
            priority: None,
            palette_index: Some(1),
        }
    }

    #[test]
    fn test_pack_grid_layout() {
        let sprites = vec![sprite(0, 8, 8), sprite(1, 16, 16), sprite(2, 8, 32)];
        let options = SpritesheetOptions {
            columns: 2,
            spacing: 2,
        };
        let (image, meta) = pack_spritesheet(&sprites, &options);

        assert_eq!(meta.sprites[0], SpriteRect { id: 0, x: 0, y: 0, w: 8, h: 8 });
        assert_eq!(meta.sprites[1], SpriteRect { id: 1, x: 10, y: 0, w: 16, h: 16 });
        assert_eq!(meta.sprites[2], SpriteRect { id: 2, x: 0, y: 18, w: 8, h: 32 });
        assert_eq!((meta.image_width, meta.image_height), (26, 50));
        assert_eq!((image.width, image.height), (26, 50));
        assert_eq!(image.get(10, 0), Some([1, 0, 0, 255]));
        assert_eq!(image.get(8, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_packed_rects_disjoint_and_inside() {
        let sprites: Vec<Sprite> = (0..11).map(|i| sprite(i, 8 + (i as u32 % 3) * 8, 8)).collect();
        let (_, meta) = pack_spritesheet(&sprites, &SpritesheetOptions::default());
        for (i, a) in meta.sprites.iter().enumerate() {
            assert!(a.x + a.w <= meta.image_width && a.y + a.h <= meta.image_height);
            for b in &meta.sprites[i + 1..] {
                let overlap =
                    a.x < b.x + b.w && b.x < a.x + a.w && a.y < b.y + b.h && b.y < a.y + a.h;
                assert!(!overlap, "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_pack_empty() {
        let (image, meta) = pack_spritesheet(&[], &SpritesheetOptions::default());
        assert!(image.is_empty());
        assert!(meta.sprites.is_empty());
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["imageWidth"], 0);
    }

    #[test]
    fn test_frame_metadata_json_shape() {
        let mut frame = FrameIR::new(SystemId::MegaDrive);
        frame.palettes.push(Palette::from_rgb(
            "PAL0",
            SystemId::MegaDrive,
            PaletteSource::Cram,
            [[0, 0, 255]; 16],
        ));
        frame.tilesets.push(Tileset::default());
        frame.layers.push(Layer {
            name: "Plane A".into(),
            kind: LayerKind::Background,
            tileset: 0,
            tilemap: Tilemap::blank(64, 32),
            palette_group: vec![0],
            scroll: Scroll::default(),
            wrap: true,
            priority_order: 1,
        });
        frame.sprites.push(sprite(3, 16, 16));

        let json = serde_json::to_value(frame_metadata(&frame)).unwrap();
        assert_eq!(json["system"], "megadrive");
        assert_eq!(json["palettes"][0]["colors"][0], "#0000FF");
        assert_eq!(json["tilesets"][0]["tileCount"], 0);
        assert_eq!(json["tilesets"][0]["tileSize"]["width"], 8);
        assert_eq!(json["layers"][0]["kind"], "background");
        assert_eq!(json["layers"][0]["width"], 64);
        assert_eq!(json["sprites"][0]["id"], 3);
        assert_eq!(json["sprites"][0]["paletteIndex"], 1);
    }
}
