//! Pixel diff between a reconstructed frame and the emulator's framebuffer.

use crate::logging::{log, LogCategory, LogLevel};
use crate::types::Image;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffScore {
    /// Pixels compared
    pub total: u64,
    /// Pixels where any RGBA channel differs
    pub diff: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiffResult {
    pub image: Image,
    pub score: DiffScore,
}

/// Compare two images over their overlapping region.
///
/// The diff image shows `|dr|`, `|dg| * 0.3`, `|db|` with alpha set to the
/// largest channel difference, so identical pixels come out transparent.
pub fn diff(a: &Image, b: &Image) -> DiffResult {
    let width = a.width.min(b.width);
    let height = a.height.min(b.height);
    if (a.width, a.height) != (b.width, b.height) {
        log(LogCategory::Validate, LogLevel::Warn, || {
            format!(
                "comparing {}x{} against {}x{}; only the {}x{} overlap is scored",
                a.width, a.height, b.width, b.height, width, height
            )
        });
    }

    let mut image = Image::new(width, height);
    let mut differing = 0u64;
    for y in 0..height {
        for x in 0..width {
            let (Some(pa), Some(pb)) = (a.get(x, y), b.get(x, y)) else {
                continue;
            };
            let d = [
                pa[0].abs_diff(pb[0]),
                pa[1].abs_diff(pb[1]),
                pa[2].abs_diff(pb[2]),
                pa[3].abs_diff(pb[3]),
            ];
            if d.iter().any(|&c| c != 0) {
                differing += 1;
            }
            let green = (d[1] as u16 * 3 / 10) as u8;
            let alpha = d[0].max(d[1]).max(d[2]).max(d[3]);
            image.put(x as i32, y as i32, [d[0], green, d[2], alpha]);
        }
    }

    let total = width as u64 * height as u64;
    let percent = if total == 0 {
        0.0
    } else {
        differing as f64 / total as f64 * 100.0
    };
    log(LogCategory::Validate, LogLevel::Info, || {
        format!("{} of {} pixels differ ({:.3}%)", differing, total, percent)
    });

    DiffResult {
        image,
        score: DiffScore {
            total,
            diff: differing,
            percent,
        },
    }
}
