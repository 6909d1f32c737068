//! Write the "Valid Ratios" section into description files
//!
//! ```text
//! Dimensions
//!     16"x24"
//!
//! Valid Ratios
//!     4x6, 8x12, 12x18, 16x24, 24x36
//! ```

use super::ratios::match_ratio;
use super::validator::{derive_basename, match_primary_image};
use crate::error::{ArtworkError, Result};
use crate::imaging;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Extensions tried, in order, when the folder has no primary image
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "gif"];

static DIMENSIONS_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Dimensions\s*$").expect("dimensions regex"));
static VALID_RATIOS_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Valid\s+Ratios\s*$").expect("valid ratios regex"));

/// Header written above the list of sizes
pub const VALID_RATIOS_HEADER: &str = "Valid Ratios";

fn is_content_line(line: &str) -> bool {
    line.starts_with("    ") || line.starts_with('\t')
}

/// Rewrite description text with a fresh "Valid Ratios" section
///
/// Any old section is removed. The new one goes right after the first
/// `Dimensions` header and the line following it, and only when `sizes`
/// is not empty. Text without a `Dimensions` header just loses the old
/// section.
pub fn annotate_valid_ratios(text: &str, sizes: &[String]) -> String {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut out = String::with_capacity(text.len() + 64);
    let mut added = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if VALID_RATIOS_LINE_RE.is_match(line.trim()) {
            // Drop the blank line that separated the old section
            while out.ends_with("\n\n") {
                out.pop();
            }
            i += 1;
            while i < lines.len() && is_content_line(lines[i]) {
                i += 1;
            }
            continue;
        }

        if !added && DIMENSIONS_LINE_RE.is_match(line.trim()) {
            out.push_str(line);
            i += 1;

            if let Some(value_line) = lines.get(i) {
                out.push_str(value_line);
                if !value_line.ends_with('\n') {
                    out.push('\n');
                }
                i += 1;

                if !sizes.is_empty() {
                    out.push('\n');
                    out.push_str(VALID_RATIOS_HEADER);
                    out.push('\n');
                    out.push_str("    ");
                    out.push_str(&sizes.join(", "));
                    out.push('\n');
                    added = true;
                }
            }
            continue;
        }

        out.push_str(line);
        i += 1;
    }

    out
}

/// Image used to measure an artwork: the primary image if the folder has
/// one, otherwise the first file by extension preference
pub fn find_ratio_image(art_dir: &Path) -> Option<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(art_dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let name = art_dir.file_name()?.to_string_lossy().to_string();
    if let Ok(basename) = derive_basename(&name) {
        if let Some(primary) = match_primary_image(&basename, &files) {
            return Some(primary);
        }
    }

    IMAGE_EXTENSIONS.iter().find_map(|wanted| {
        files
            .iter()
            .find(|path| {
                path.extension()
                    .map(|e| e.to_string_lossy().eq_ignore_ascii_case(wanted))
                    .unwrap_or(false)
            })
            .cloned()
    })
}

/// Outcome of annotating one description file
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotateOutcome {
    pub image: PathBuf,
    pub pixel_size: (u32, u32),
    pub simplified: (u64, u64),
    pub sizes: Vec<String>,
    /// File content changed (and was written unless this is a dry run)
    pub changed: bool,
}

/// Measure the artwork in `art_dir` and update its description file
pub fn annotate_directory(art_dir: &Path, dry_run: bool) -> Result<Option<AnnotateOutcome>> {
    let name = art_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let txt_file = art_dir.join(format!("{}.txt", name));
    info!("Processing: {}", name);

    let Some(image) = find_ratio_image(art_dir) else {
        warn!("  No image file found in {}", name);
        return Ok(None);
    };

    let info = match imaging::probe(&image) {
        Ok(info) => info,
        Err(e) => {
            warn!("  Could not read image dimensions from {:?}: {}", image.file_name(), e);
            return Ok(None);
        }
    };

    let matched = match_ratio(info.width as f64, info.height as f64)?;
    let sizes = matched.labels();

    info!("  Image: {:?} ({}x{})", image.file_name().unwrap_or_default(), info.width, info.height);
    info!("  Pixel ratio: {}:{}", matched.simplified.0, matched.simplified.1);
    info!(
        "  Valid print sizes: {}",
        if sizes.is_empty() { "None found".to_string() } else { sizes.join(", ") }
    );

    let text = fs::read_to_string(&txt_file).map_err(|e| ArtworkError::io(&txt_file, e))?;
    let updated = annotate_valid_ratios(&text, &sizes);
    let changed = updated != text;

    if dry_run {
        info!("  [DRY RUN] Would update {}", txt_file.display());
    } else if changed {
        fs::write(&txt_file, &updated).map_err(|e| ArtworkError::io(&txt_file, e))?;
        info!("  ✓ Updated {:?}", txt_file.file_name().unwrap_or_default());
    }

    Ok(Some(AnnotateOutcome {
        image,
        pixel_size: (info.width, info.height),
        simplified: matched.simplified,
        sizes,
        changed,
    }))
}

/// Folders under `root` that start with a digit and have a description file
pub fn annotatable_directories(root: &Path) -> Result<Vec<PathBuf>> {
    Ok(super::validator::artwork_directories(root)?
        .into_iter()
        .filter(|dir| {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            name.starts_with(|c: char| c.is_ascii_digit())
                && dir.join(format!("{}.txt", name)).is_file()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn sizes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_inserts_after_dimensions_value() {
        let text = "Title\n\tFoo\nDimensions\n\t16\"x24\"\nMedium\n\tOil\n";
        let out = annotate_valid_ratios(text, &sizes(&["4x6", "24x36"]));
        assert_eq!(
            out,
            "Title\n\tFoo\nDimensions\n\t16\"x24\"\n\nValid Ratios\n    4x6, 24x36\nMedium\n\tOil\n"
        );
    }

    #[test]
    fn test_replaces_existing_section() {
        let text = "Dimensions\n\t8x10\n\nValid Ratios\n    8x10, 16x20\nMedium\n\tInk\n";
        let out = annotate_valid_ratios(text, &sizes(&["8x10"]));
        assert_eq!(out, "Dimensions\n\t8x10\n\nValid Ratios\n    8x10\nMedium\n\tInk\n");

        // Running again gives the same text
        assert_eq!(annotate_valid_ratios(&out, &sizes(&["8x10"])), out);
    }

    #[test]
    fn test_no_matches_removes_section() {
        let text = "Dimensions\n\t1x10\nValid Ratios\n\t4x6\nTitle\n\tX\n";
        let out = annotate_valid_ratios(text, &[]);
        assert_eq!(out, "Dimensions\n\t1x10\nTitle\n\tX\n");
    }

    #[test]
    fn test_without_dimensions_text_is_unchanged() {
        let text = "Title\n\tNo dims\n";
        assert_eq!(annotate_valid_ratios(text, &sizes(&["4x6"])), text);
    }

    #[test]
    fn test_dimensions_on_last_line_without_newline() {
        let out = annotate_valid_ratios("Dimensions\n\t4x6", &sizes(&["4x6"]));
        assert_eq!(out, "Dimensions\n\t4x6\n\nValid Ratios\n    4x6\n");
    }

    #[test]
    fn test_find_ratio_image_prefers_primary() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("8-Desert_Sunset");
        fs::create_dir_all(&dir).unwrap();
        RgbImage::new(4, 4).save(dir.join("aaa.jpg")).unwrap();
        RgbImage::new(4, 4).save(dir.join("LindseyAyres_DesertSunset.png")).unwrap();

        assert_eq!(
            find_ratio_image(&dir),
            Some(dir.join("LindseyAyres_DesertSunset.png"))
        );
    }

    #[test]
    fn test_find_ratio_image_falls_back_to_extension_order() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("9-Beige");
        fs::create_dir_all(&dir).unwrap();
        RgbImage::new(4, 4).save(dir.join("a.png")).unwrap();
        RgbImage::new(4, 4).save(dir.join("z.jpg")).unwrap();

        assert_eq!(find_ratio_image(&dir), Some(dir.join("z.jpg")));
    }

    #[test]
    fn test_annotate_directory_writes_file() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("12-Fire");
        fs::create_dir_all(&dir).unwrap();
        let txt = dir.join("12-Fire.txt");
        fs::write(&txt, "Title\n\tFire\nDimensions\n\t16\"x24\"\n").unwrap();
        RgbImage::new(200, 300).save(dir.join("LindseyAyres_Fire.png")).unwrap();

        let dry = annotate_directory(&dir, true).unwrap().unwrap();
        assert!(dry.changed);
        assert!(!fs::read_to_string(&txt).unwrap().contains("Valid Ratios"));

        let outcome = annotate_directory(&dir, false).unwrap().unwrap();
        assert_eq!(outcome.pixel_size, (200, 300));
        assert_eq!(outcome.simplified, (2, 3));
        assert!(outcome.sizes.contains(&"24x36".to_string()));

        let written = fs::read_to_string(&txt).unwrap();
        assert!(written.contains("\nValid Ratios\n    4x6, 8x12, "));

        let again = annotate_directory(&dir, false).unwrap().unwrap();
        assert!(!again.changed);
    }

    #[test]
    fn test_annotatable_directories() {
        let root = tempfile::tempdir().unwrap();
        for name in ["01-A", "02-B", "Misc"] {
            let dir = root.path().join(name);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(format!("{}.txt", name)), "Title\n\tX\n").unwrap();
        }
        fs::create_dir_all(root.path().join("03-NoText")).unwrap();

        let dirs = annotatable_directories(root.path()).unwrap();
        assert_eq!(dirs, vec![root.path().join("01-A"), root.path().join("02-B")]);
    }
}
