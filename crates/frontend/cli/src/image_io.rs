//! PNG read/write for `Image`.

use anyhow::{bail, Context, Result};
use ir_core::types::Image;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Read any 8- or 16-bit PNG as RGBA8.
pub fn read_png(path: &Path) -> Result<Image> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut decoder = png::Decoder::new(file);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .with_context(|| format!("reading PNG header of {}", path.display()))?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .with_context(|| format!("decoding {}", path.display()))?;
    let bytes = &buf[..info.buffer_size()];

    let pixel_count = info.width as usize * info.height as usize;
    let mut rgba = Vec::with_capacity(pixel_count * 4);
    match info.color_type {
        png::ColorType::Rgba => rgba.extend_from_slice(bytes),
        png::ColorType::Rgb => {
            for px in bytes.chunks_exact(3) {
                rgba.extend_from_slice(&[px[0], px[1], px[2], 0xFF]);
            }
        }
        png::ColorType::GrayscaleAlpha => {
            for px in bytes.chunks_exact(2) {
                rgba.extend_from_slice(&[px[0], px[0], px[0], px[1]]);
            }
        }
        png::ColorType::Grayscale => {
            for &v in bytes {
                rgba.extend_from_slice(&[v, v, v, 0xFF]);
            }
        }
        other => bail!("{}: unsupported PNG color type {:?}", path.display(), other),
    }

    let image = Image::from_rgba(info.width, info.height, rgba)
        .with_context(|| format!("{} has a truncated pixel buffer", path.display()))?;
    log::debug!(
        "read {} ({}x{})",
        path.display(),
        image.width,
        image.height
    );
    Ok(image)
}

pub fn write_png(path: &Path, image: &Image) -> Result<()> {
    if image.is_empty() {
        bail!("refusing to write empty image to {}", path.display());
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), image.width, image.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&image.pixels)?;
    log::info!(
        "wrote {} ({}x{})",
        path.display(),
        image.width,
        image.height
    );
    Ok(())
}
