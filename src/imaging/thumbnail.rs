use crate::error::{ArtworkError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::RgbImage;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Max width of the `-sm` variant (five per row on a 1080p screen)
pub const SMALL_IMAGE_MAX_WIDTH: u32 = 384;

/// Max width of the `-med` variant (half a desktop screen)
pub const MEDIUM_IMAGE_MAX_WIDTH: u32 = 960;

/// JPEG quality for generated variants
pub const IMAGE_QUALITY: u8 = 85;

/// What happened when a variant was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// Source was already narrow enough and was copied byte for byte
    Copied { width: u32, height: u32 },
    /// Source was scaled down and re-encoded
    Resized { width: u32, height: u32 },
}

impl ResizeOutcome {
    pub fn dimensions(&self) -> (u32, u32) {
        match *self {
            ResizeOutcome::Copied { width, height } | ResizeOutcome::Resized { width, height } => {
                (width, height)
            }
        }
    }
}

/// Height after scaling `width x height` down to `max_width`, keeping the
/// aspect ratio. Truncated, never below 1.
pub fn scaled_height(width: u32, height: u32, max_width: u32) -> u32 {
    let ratio = max_width as f64 / width as f64;
    ((height as f64 * ratio) as u32).max(1)
}

/// Write a copy of `source` to `dest` that is at most `max_width` pixels wide
pub fn resize_to_width(
    source: &Path,
    dest: &Path,
    max_width: u32,
    quality: u8,
) -> Result<ResizeOutcome> {
    let img = image::open(source).map_err(|e| ArtworkError::image(source, e))?;
    let (width, height) = (img.width(), img.height());

    if width <= max_width {
        debug!("Image already small enough ({}px), copying as-is", width);
        if let Err(e) = fs::copy(source, dest) {
            remove_partial(dest);
            return Err(ArtworkError::io(dest, e));
        }
        return Ok(ResizeOutcome::Copied { width, height });
    }

    let new_height = scaled_height(width, height, max_width);
    let resized = img.resize_exact(max_width, new_height, FilterType::Lanczos3);

    // JPEG has no alpha channel
    let rgb = resized.to_rgb8();

    if let Err(e) = write_jpeg(&rgb, dest, quality) {
        remove_partial(dest);
        return Err(e);
    }

    if let (Ok(before), Ok(after)) = (fs::metadata(source), fs::metadata(dest)) {
        debug!(
            "Resized {}x{} ({} bytes) -> {}x{} ({} bytes)",
            width,
            height,
            before.len(),
            max_width,
            new_height,
            after.len()
        );
    }

    Ok(ResizeOutcome::Resized {
        width: max_width,
        height: new_height,
    })
}

fn write_jpeg(rgb: &RgbImage, dest: &Path, quality: u8) -> Result<()> {
    let file = File::create(dest).map_err(|e| ArtworkError::io(dest, e))?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode_image(rgb)
        .map_err(|e| ArtworkError::image(dest, e))?;
    writer.flush().map_err(|e| ArtworkError::io(dest, e))
}

/// Drop a half-written variant so the next run regenerates it.
/// Only regular files are removed.
fn remove_partial(dest: &Path) {
    if dest.is_file() {
        if let Err(e) = fs::remove_file(dest) {
            warn!("Could not remove partial file {}: {}", dest.display(), e);
        }
    }
}

/// Generate a resized variant, logging instead of failing
/// Returns true if `dest` was written
pub fn generate_resized_image(source: &Path, dest: &Path, max_width: u32) -> bool {
    match resize_to_width(source, dest, max_width, IMAGE_QUALITY) {
        Ok(outcome) => {
            let (w, h) = outcome.dimensions();
            info!("📸 Generated {} ({}x{})", dest.display(), w, h);
            true
        }
        Err(e) => {
            warn!(
                "Error generating resized image {:?}: {}",
                dest.file_name().unwrap_or_default(),
                e
            );
            false
        }
    }
}
