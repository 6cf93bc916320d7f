//! Snapshot directories: one `<region>.bin` file per captured region plus an
//! optional `framebuffer.png`.

use crate::image_io::read_png;
use anyhow::{bail, Context, Result};
use ir_core::snapshot::{MemorySnapshot, Region};
use std::fs;
use std::path::Path;

pub const FRAMEBUFFER_FILE: &str = "framebuffer.png";

pub fn region_file(region: Region) -> String {
    format!("{}.bin", region.name())
}

/// Load the files in `dir` for `regions`, the set the target adapter reads.
/// Absent files leave the region empty; the adapter reports what it missed.
pub fn load(dir: &Path, regions: &[Region]) -> Result<MemorySnapshot> {
    if !dir.is_dir() {
        bail!("snapshot directory {} does not exist", dir.display());
    }

    let mut snapshot = MemorySnapshot::new();
    for region in Region::ALL {
        let path = dir.join(region_file(region));
        if !path.exists() {
            continue;
        }
        if !regions.contains(&region) {
            log::warn!("{}: not used by this system, skipped", path.display());
            continue;
        }
        let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        log::debug!("{}: {} bytes", path.display(), bytes.len());
        snapshot = snapshot.with_region(region, &bytes);
    }

    let fb_path = dir.join(FRAMEBUFFER_FILE);
    if fb_path.exists() {
        let image = read_png(&fb_path)?;
        snapshot = snapshot.with_framebuffer(&image.pixels, image.width, image.height);
    }
    Ok(snapshot)
}
