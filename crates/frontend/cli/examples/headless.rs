//! Decode a synthetic snapshot without touching the filesystem.
//!
//! `cargo run --example headless -- gb`

use ir_core::compositor::{render, RenderOptions};
use ir_core::export::frame_metadata;
use ir_core::snapshot::{MemorySnapshot, Region};
use ir_core::Adapter;
use std::env;

fn synthetic_snapshot(system: &str) -> MemorySnapshot {
    match system {
        "gb" | "gbc" => {
            let mut vram = vec![0u8; 0x4000];
            vram[16..32].fill(0xFF);
            for cell in (0..32 * 32).step_by(3) {
                vram[0x1800 + cell] = 1;
            }
            let mut palettes = vec![0u8; 128];
            palettes[6..8].copy_from_slice(&0x7C1Fu16.to_le_bytes());
            MemorySnapshot::new()
                .with_region(Region::Vram, &vram)
                .with_region(Region::Palettes, &palettes)
        }
        _ => {
            let mut vram = vec![0u8; 0x10000];
            vram[32..64].fill(0x11);
            for cell in 0..64 * 32 {
                vram[0xC000 + cell * 2] = (cell % 2) as u8;
            }
            let mut cram = vec![0u8; 128];
            cram[2..4].copy_from_slice(&0x000Eu16.to_le_bytes());
            MemorySnapshot::new()
                .with_region(Region::Vram, &vram)
                .with_region(Region::Cram, &cram)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let system = args.get(1).map(|s| s.as_str()).unwrap_or("megadrive");

    let adapter = ir_cli::lookup(system)?;
    let frame = adapter.build_frame_ir(&synthetic_snapshot(system));
    let image = render(&frame, None, None, &RenderOptions::default());
    println!(
        "Headless {} frame: {}x{}",
        adapter.system().display_name(),
        image.width,
        image.height
    );
    println!("{}", serde_json::to_string_pretty(&frame_metadata(&frame))?);
    for message in frame.diagnostics.iter() {
        println!("diagnostic: {}", message);
    }
    Ok(())
}
