//! Cheap image checks: is this file a raster image, and how big is it
//!
//! Only the header is decoded, so probing a folder of large scans stays fast.

use crate::error::{ArtworkError, Result};
use image::{ImageFormat, ImageReader};
use std::path::Path;

/// Header information for a decodable image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Decode the header of `path`
///
/// The format is detected from the file contents first, falling back to
/// the extension. Fails when neither identifies a supported raster format
/// or the header is corrupt.
pub fn probe(path: &Path) -> Result<ImageInfo> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| ArtworkError::io(path, e))?;

    let format = reader.format().ok_or_else(|| ArtworkError::NotAnImage {
        path: path.to_path_buf(),
    })?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ArtworkError::image(path, e))?;

    Ok(ImageInfo {
        format,
        width,
        height,
    })
}

/// Pixel dimensions, or `None` when the file is missing or not an image
pub fn dimensions(path: &Path) -> Option<(u32, u32)> {
    match probe(path) {
        Ok(info) => Some((info.width, info.height)),
        Err(e) => {
            tracing::debug!("Could not read dimensions: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_probe_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        RgbImage::from_pixel(12, 7, Rgb([200, 10, 10])).save(&path).unwrap();

        let info = probe(&path).unwrap();
        assert_eq!(info.format, ImageFormat::Png);
        assert_eq!((info.width, info.height), (12, 7));
        assert_eq!(dimensions(&path), Some((12, 7)));
    }

    #[test]
    fn test_probe_detects_format_from_contents() {
        let dir = tempfile::tempdir().unwrap();
        let png_path = dir.path().join("real.png");
        RgbImage::new(3, 4).save(&png_path).unwrap();

        // PNG bytes behind a .dat name still probe fine
        let odd_name = dir.path().join("scan.dat");
        std::fs::copy(&png_path, &odd_name).unwrap();
        assert_eq!(probe(&odd_name).unwrap().format, ImageFormat::Png);
    }

    #[test]
    fn test_probe_rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();

        let notes = dir.path().join("notes.md");
        std::fs::write(&notes, "not an image").unwrap();
        assert!(matches!(probe(&notes), Err(ArtworkError::NotAnImage { .. })));

        let fake = dir.path().join("fake.jpg");
        std::fs::write(&fake, "definitely not a jpeg").unwrap();
        assert!(probe(&fake).is_err());

        assert!(probe(&dir.path().join("missing.png")).is_err());
        assert_eq!(dimensions(&fake), None);
    }
}
