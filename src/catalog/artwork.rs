//! Build catalog records from artwork folders
//!
//! Combines the parsed description file, the image variants on disk and
//! the field transforms into an [`ArtworkRecord`].

use super::fields::{parse_fields, FieldRecord};
use super::transform::{determine_for_sale, format_categories, parse_date_produced, parse_price};
use super::validator::derive_basename;
use crate::error::{ArtworkError, Result};
use crate::imaging::{self, thumbnail};
use crate::state::data::{ArtworkRecord, ImageVariant};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File names of the three variants of one artwork
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantNames {
    pub large: String,
    pub medium: String,
    pub small: String,
}

impl VariantNames {
    pub fn for_basename(basename: &str) -> Self {
        Self {
            large: format!("{}.jpg", basename),
            medium: format!("{}-med.jpg", basename),
            small: format!("{}-sm.jpg", basename),
        }
    }
}

/// The three variants found (or generated) for an artwork
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtworkImages {
    pub small: ImageVariant,
    pub medium: ImageVariant,
    pub large: ImageVariant,
}

/// Web path the site serves an artwork image from
pub fn web_path(dir_name: &str, file_name: &str) -> String {
    format!("/images/{}/{}", dir_name, file_name)
}

/// Find a file in `dir` whose name equals `file_name` ignoring case
pub fn find_file_case_insensitive(dir: &Path, file_name: &str) -> Option<PathBuf> {
    let wanted = file_name.to_lowercase();
    fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .find(|path| {
            path.is_file()
                && path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_lowercase() == wanted)
                    .unwrap_or(false)
        })
}

fn variant(dir_name: &str, path: &Path) -> ImageVariant {
    if !path.is_file() {
        return ImageVariant::default();
    }
    let (width, height) = match imaging::dimensions(path) {
        Some((w, h)) => (Some(w), Some(h)),
        None => (None, None),
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    ImageVariant {
        url: web_path(dir_name, &file_name),
        width,
        height,
    }
}

/// Locate the large, medium and small images of an artwork folder.
/// With `generate_thumbnails`, missing `-med` / `-sm` files are created from
/// the large image first.
pub fn find_artwork_images(art_dir: &Path, generate_thumbnails: bool) -> Result<ArtworkImages> {
    let dir_name = art_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let names = VariantNames::for_basename(&derive_basename(&dir_name)?);

    let exact = art_dir.join(&names.large);
    let large_path = if exact.is_file() {
        exact
    } else if let Some(found) = find_file_case_insensitive(art_dir, &names.large) {
        found
    } else {
        warn!("  Large image not found: {}", names.large);
        let jpgs = jpeg_files(art_dir);
        if !jpgs.is_empty() {
            warn!("    Found JPG files: {:?}", jpgs);
        }
        return Ok(ArtworkImages::default());
    };
    debug!("  Found large image: {:?}", large_path.file_name());

    let medium_path = art_dir.join(&names.medium);
    let small_path = art_dir.join(&names.small);

    for (path, max_width, label) in [
        (&medium_path, thumbnail::MEDIUM_IMAGE_MAX_WIDTH, "medium"),
        (&small_path, thumbnail::SMALL_IMAGE_MAX_WIDTH, "small"),
    ] {
        if path.exists() {
            continue;
        }
        if generate_thumbnails {
            info!("  Generating {} image: {:?}", label, path.file_name());
            thumbnail::generate_resized_image(&large_path, path, max_width);
        } else {
            debug!("  {} image not found (use --generate-thumbnails to create)", label);
        }
    }

    Ok(ArtworkImages {
        small: variant(&dir_name, &small_path),
        medium: variant(&dir_name, &medium_path),
        large: variant(&dir_name, &large_path),
    })
}

fn jpeg_files(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .map(|e| matches!(e.to_string_lossy().to_lowercase().as_str(), "jpg" | "jpeg"))
                .unwrap_or(false)
        })
        .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().to_string()))
        .collect();
    names.sort();
    names
}

/// Turn parsed fields and images into a catalog record
pub fn build_record(
    fields: &FieldRecord,
    images: ArtworkImages,
    featured_titles: &HashSet<String>,
) -> Option<ArtworkRecord> {
    let title = fields.text("title").trim();
    if title.is_empty() {
        return None;
    }

    let raw_price = fields.text("originalprice").trim();

    Some(ArtworkRecord {
        title: title.to_string(),
        art_description: fields.text("artdescription").trim().to_string(),
        dimensions: fields.text("dimensions").trim().to_string(),
        small_image: images.small,
        medium_image: images.medium,
        large_image: images.large,
        link_to_print: fields.text("linktoprint").trim().to_string(),
        date_produced: parse_date_produced(fields.text("dateproduced")),
        original_price: parse_price(raw_price),
        for_sale: determine_for_sale(raw_price),
        location: fields.text("location").trim().to_string(),
        medium: fields.text("medium").trim().to_string(),
        categories: format_categories(fields.text("categories")),
        is_featured: featured_titles.contains(title),
    })
}

/// Read, parse and assemble one artwork folder
pub fn process_artwork_directory(
    art_dir: &Path,
    featured_titles: &HashSet<String>,
    generate_thumbnails: bool,
) -> Result<ArtworkRecord> {
    let dir_name = art_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let txt_file = art_dir.join(format!("{}.txt", dir_name));

    let text = fs::read_to_string(&txt_file).map_err(|e| ArtworkError::io(&txt_file, e))?;
    let fields = parse_fields(&text);
    debug!("  Parsed fields: {:?}", fields.names().collect::<Vec<_>>());

    let images = find_artwork_images(art_dir, generate_thumbnails)?;
    let record = build_record(&fields, images, featured_titles)
        .ok_or(ArtworkError::MissingTitle { path: txt_file })?;

    debug!("  Title: {}", record.title);
    debug!("  Categories: {}", record.categories);
    debug!("  Featured: {}", record.is_featured);
    debug!("  For Sale: {}", record.for_sale);
    debug!("  Date: {:?}", record.date_produced);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    const DESCRIPTION: &str = "Title\n\
        \tThe Maypole Unicorn\n\
        \n\
        ArtDescription\n\
        \tA unicorn dances.\n\
        \tEveryone cheers.\n\
        Dimensions\n\
        \t14\"x17\"\n\
        DateProduced\n\
        \t2021\n\
        OriginalPrice - Price of the original, not the print\n\
        \t$1,200\n\
        Categories\n\
        \tacrylic, painting, paint pouring\n\
        Medium\n\
        \tAcrylic on canvas\n";

    fn featured() -> HashSet<String> {
        ["The Maypole Unicorn".to_string()].into_iter().collect()
    }

    fn make_folder(root: &Path) -> PathBuf {
        let dir = root.join("12-The_Maypole_Unicorn");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("12-The_Maypole_Unicorn.txt"), DESCRIPTION).unwrap();
        RgbImage::new(1200, 1800)
            .save(dir.join("LindseyAyres_TheMaypoleUnicorn.jpg"))
            .unwrap();
        dir
    }

    #[test]
    fn test_variant_names() {
        let names = VariantNames::for_basename("LindseyAyres_Fire");
        assert_eq!(names.large, "LindseyAyres_Fire.jpg");
        assert_eq!(names.medium, "LindseyAyres_Fire-med.jpg");
        assert_eq!(names.small, "LindseyAyres_Fire-sm.jpg");
    }

    #[test]
    fn test_build_record_from_fields() {
        let record = build_record(&parse_fields(DESCRIPTION), ArtworkImages::default(), &featured()).unwrap();

        assert_eq!(record.title, "The Maypole Unicorn");
        assert_eq!(record.art_description, "A unicorn dances.\nEveryone cheers.");
        assert_eq!(record.dimensions, "14\"x17\"");
        assert_eq!(record.date_produced.as_deref(), Some("2021-01-01"));
        assert_eq!(record.original_price, 1200.0);
        assert!(record.for_sale);
        assert_eq!(record.categories, "Acrylic,Painting,Paint Pouring");
        assert_eq!(record.medium, "Acrylic on canvas");
        assert_eq!(record.location, "");
        assert!(record.is_featured);
    }

    #[test]
    fn test_build_record_needs_title() {
        let fields = parse_fields("Title\nMedium\n\tInk\n");
        assert!(build_record(&fields, ArtworkImages::default(), &HashSet::new()).is_none());
    }

    #[test]
    fn test_process_directory_without_thumbnails() {
        let root = tempfile::tempdir().unwrap();
        let dir = make_folder(root.path());

        let record = process_artwork_directory(&dir, &HashSet::new(), false).unwrap();
        assert!(!record.is_featured);
        assert_eq!(
            record.large_image.url,
            "/images/12-The_Maypole_Unicorn/LindseyAyres_TheMaypoleUnicorn.jpg"
        );
        assert_eq!(record.large_image.width, Some(1200));
        assert_eq!(record.large_image.height, Some(1800));
        assert!(!record.small_image.is_present());
        assert!(!record.medium_image.is_present());
    }

    #[test]
    fn test_process_directory_generates_thumbnails() {
        let root = tempfile::tempdir().unwrap();
        let dir = make_folder(root.path());

        let record = process_artwork_directory(&dir, &featured(), true).unwrap();
        assert_eq!(record.small_image.width, Some(384));
        assert_eq!(record.small_image.height, Some(576));
        assert_eq!(record.medium_image.width, Some(960));
        assert_eq!(record.medium_image.height, Some(1440));
        assert!(dir.join("LindseyAyres_TheMaypoleUnicorn-sm.jpg").is_file());
        assert!(dir.join("LindseyAyres_TheMaypoleUnicorn-med.jpg").is_file());
    }

    #[test]
    fn test_large_image_found_ignoring_case() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("3-Fire");
        fs::create_dir_all(&dir).unwrap();
        RgbImage::new(10, 20).save(dir.join("tmp.jpg")).unwrap();
        fs::rename(dir.join("tmp.jpg"), dir.join("lindseyayres_fire.JPG")).unwrap();

        let images = find_artwork_images(&dir, false).unwrap();
        assert_eq!(images.large.url, "/images/3-Fire/lindseyayres_fire.JPG");
        assert_eq!(images.large.width, Some(10));
    }

    #[test]
    fn test_missing_large_image_leaves_variants_empty() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("4-Snail_Trails");
        fs::create_dir_all(&dir).unwrap();
        RgbImage::new(10, 20).save(dir.join("random.jpg")).unwrap();

        let images = find_artwork_images(&dir, true).unwrap();
        assert_eq!(images, ArtworkImages::default());
        assert_eq!(jpeg_files(&dir), vec!["random.jpg"]);
    }

    #[test]
    fn test_missing_description_file_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("5-Empty");
        fs::create_dir_all(&dir).unwrap();
        assert!(matches!(
            process_artwork_directory(&dir, &HashSet::new(), false),
            Err(ArtworkError::Io { .. })
        ));
    }
}
