//! The work behind each `vdpir` subcommand.

use crate::image_io::{read_png, write_png};
use crate::registry;
use crate::settings::Settings;
use crate::snapshot_dir;
use anyhow::{anyhow, bail, Context, Result};
use ir_core::compositor::{render, RenderOptions};
use ir_core::export::{frame_metadata, pack_spritesheet, FrameMetadata};
use ir_core::ir::FrameIR;
use ir_core::validator::{diff, DiffScore};
use ir_core::Adapter;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub metadata: FrameMetadata,
    pub diagnostics: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    pub system: String,
    pub snapshot: PathBuf,
    pub out: PathBuf,
    /// Overrides `Settings::layers`
    pub layers: Option<Vec<usize>>,
    pub metadata: Option<PathBuf>,
    /// Where to write the diff image against the captured framebuffer
    pub diff: Option<PathBuf>,
}

/// Load a snapshot directory and build its frame.
pub fn decode(system: &str, snapshot: &Path) -> Result<FrameIR> {
    let adapter = registry::lookup(system)?;
    let snapshot = snapshot_dir::load(snapshot, adapter.regions())?;
    let frame = adapter.build_frame_ir(&snapshot);
    for message in frame.diagnostics.iter() {
        log::info!("{}: {}", adapter.system(), message);
    }
    Ok(frame)
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let contents = serde_json::to_string_pretty(value)?;
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn check_threshold(settings: &Settings, score: &DiffScore) -> Result<()> {
    if settings.exceeds_threshold(score.percent) {
        bail!(
            "{:.3}% of pixels differ, above the {:.3}% limit",
            score.percent,
            settings.fail_above_percent.unwrap_or_default()
        );
    }
    Ok(())
}

/// Render a snapshot. Returns the diff score when a diff was requested.
pub fn render_snapshot(request: &RenderRequest, settings: &Settings) -> Result<Option<DiffScore>> {
    let frame = decode(&request.system, &request.snapshot)?;
    let options = match request.layers.as_ref().or(settings.layers.as_ref()) {
        Some(indices) => RenderOptions::layers(indices.iter().copied()),
        None => RenderOptions::default(),
    };
    let image = render(&frame, None, None, &options);
    write_png(&request.out, &image)?;

    if let Some(path) = &request.metadata {
        write_json(path, &frame_metadata(&frame))?;
    }

    let Some(diff_path) = &request.diff else {
        return Ok(None);
    };
    let captured = frame
        .framebuffer
        .as_ref()
        .ok_or_else(|| anyhow!("snapshot has no framebuffer to diff against"))?;
    let result = diff(&image, captured);
    if !result.image.is_empty() {
        write_png(diff_path, &result.image)?;
    }
    check_threshold(settings, &result.score)?;
    Ok(Some(result.score))
}

/// Pack the decoded sprites into a sheet and its JSON index.
pub fn export_sprites(
    system: &str,
    snapshot: &Path,
    out: &Path,
    json: &Path,
    settings: &Settings,
) -> Result<usize> {
    let frame = decode(system, snapshot)?;
    if frame.sprites.is_empty() {
        bail!("no sprites decoded from {}", snapshot.display());
    }
    let (sheet, metadata) = pack_spritesheet(&frame.sprites, &settings.spritesheet);
    write_png(out, &sheet)?;
    write_json(json, &metadata)?;
    Ok(metadata.sprites.len())
}

pub fn inspect(system: &str, snapshot: &Path) -> Result<InspectReport> {
    let frame = decode(system, snapshot)?;
    Ok(InspectReport {
        metadata: frame_metadata(&frame),
        diagnostics: frame.diagnostics.as_slice().to_vec(),
    })
}

/// Compare two PNG files.
pub fn diff_files(a: &Path, b: &Path, out: Option<&Path>, settings: &Settings) -> Result<DiffScore> {
    let result = diff(&read_png(a)?, &read_png(b)?);
    if let Some(out) = out {
        if result.image.is_empty() {
            log::warn!("images do not overlap, no diff image written");
        } else {
            write_png(out, &result.image)?;
        }
    }
    check_threshold(settings, &result.score)?;
    Ok(result.score)
}
