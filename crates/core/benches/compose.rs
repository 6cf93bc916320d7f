use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ir_core::compositor::{render, RenderOptions};
use ir_core::ir::{
    FrameIR, Layer, LayerKind, Palette, PaletteSource, Scroll, Tilemap, TilemapCell, Tileset,
};
use ir_core::ppu::tile::{decode_tiles, TileFormat};
use ir_core::ppu::ResolvedPalette;
use ir_core::system::SystemId;
use ir_core::types::Image;
use ir_core::validator::diff;

/// 64x32 plane over 256 distinct tiles, all four palettes in use
fn bench_frame(scroll: Scroll) -> FrameIR {
    let pattern: Vec<u8> = (0..256 * 32).map(|i| (i * 37 % 251) as u8).collect();
    let tiles = decode_tiles(
        TileFormat::MegaDrive4Bpp,
        &pattern,
        0,
        256,
        &ResolvedPalette::grayscale(),
    );

    let mut frame = FrameIR::new(SystemId::MegaDrive);
    for p in 0..4u8 {
        let mut rgb = [[0u8; 3]; 16];
        for (i, c) in rgb.iter_mut().enumerate() {
            *c = [i as u8 * 16, p * 60, 255 - i as u8 * 16];
        }
        frame.palettes.push(Palette::from_rgb(
            format!("PAL{}", p),
            SystemId::MegaDrive,
            PaletteSource::Cram,
            rgb,
        ));
    }
    frame.tilesets.push(Tileset {
        tiles,
        tile_size: Default::default(),
    });

    let cells = (0..64 * 32)
        .map(|i| TilemapCell {
            tile_index: (i % 256) as u16,
            palette: (i % 4) as u8,
            flip_h: i % 3 == 0,
            flip_v: i % 5 == 0,
            priority: i % 7 == 0,
        })
        .collect();
    if let Ok(tilemap) = Tilemap::new(64, 32, cells) {
        frame.layers.push(Layer {
            name: "Plane A".into(),
            kind: LayerKind::Background,
            tileset: 0,
            tilemap,
            palette_group: vec![0, 1, 2, 3],
            scroll,
            wrap: true,
            priority_order: 0,
        });
    }
    frame
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_320x224");

    let uniform = bench_frame(Scroll::uniform(-17, 9));
    group.bench_function("uniform_scroll", |b| {
        b.iter(|| black_box(render(&uniform, None, None, &RenderOptions::default())));
    });

    let per_line = bench_frame(Scroll {
        rows: (0..224).map(|line| -(line as i32 % 32)).collect(),
        ..Scroll::default()
    });
    group.bench_function("per_line_scroll", |b| {
        b.iter(|| black_box(render(&per_line, None, None, &RenderOptions::default())));
    });

    group.finish();
}

fn bench_tile_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("tile_decode");
    let pattern: Vec<u8> = (0..0x10000).map(|i| (i * 13 % 255) as u8).collect();

    for count in [256usize, 2048].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let tiles = decode_tiles(
                    TileFormat::MegaDrive4Bpp,
                    &pattern,
                    0,
                    count,
                    &ResolvedPalette::grayscale(),
                );
                black_box(tiles.len());
            });
        });
    }

    group.finish();
}

fn bench_diff(c: &mut Criterion) {
    let frame = bench_frame(Scroll::default());
    let a = render(&frame, None, None, &RenderOptions::default());
    let b_img = Image::new(a.width, a.height);
    c.bench_function("diff_320x224", |b| {
        b.iter(|| black_box(diff(&a, &b_img).score));
    });
}

criterion_group!(benches, bench_render, bench_tile_decode, bench_diff);
criterion_main!(benches);
