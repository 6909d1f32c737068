//! Artwork directory validation
//!
//! Every artwork lives in its own folder under the Images root, e.g.
//! `42-Ancient_Mech/`. A folder is complete when it has:
//! 1. a description file named after the folder (`42-Ancient_Mech.txt`)
//! 2. a `Title` field with a value in that file
//! 3. at least one decodable image
//! 4. an image named after the folder (`LindseyAyres_AncientMech.jpg`)
//!
//! The scan is read-only and never stops early: a bad file only affects
//! the folder it is in.

use crate::error::{ArtworkError, Result};
use crate::imaging;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Brand prefix every primary image name starts with
pub const IMAGE_PREFIX: &str = "LindseyAyres_";

/// `Title` alone on its line, then an indented line with content
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^Title\s*\n[ \t]+(\S[^\n]*)").expect("title regex"));

/// Runs of anything that is not a letter or digit
static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\W_]+").expect("separator regex"));

/// Expected primary image name (without extension) for an artwork folder
///
/// `42-Ancient_Mech` -> `LindseyAyres_AncientMech`
pub fn derive_basename(dir_name: &str) -> Result<String> {
    let (_, rest) = dir_name
        .split_once('-')
        .ok_or_else(|| ArtworkError::MissingSeparator {
            name: dir_name.to_string(),
        })?;

    Ok(format!("{}{}", IMAGE_PREFIX, SEPARATOR_RE.replace_all(rest, "")))
}

/// Title value from the raw text of a description file
pub fn extract_title(text: &str) -> Option<String> {
    TITLE_RE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Reasons a folder can be incomplete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReason {
    /// No `<dirname>.txt`
    MissingTxt,
    /// Text file exists but has no title
    MissingTitle,
    /// No decodable image at all
    MissingImg,
    /// Images exist but none is named after the folder
    MissingMatchedImg,
}

/// Outcome of validating one artwork folder
#[derive(Debug, Clone)]
pub struct DirectoryValidation {
    pub name: String,
    pub path: PathBuf,
    /// `<dirname>.txt`, whether or not it exists
    pub description_file: PathBuf,
    pub has_description: bool,
    pub title: Option<String>,
    /// Every decodable image, in directory order
    pub images: Vec<PathBuf>,
    pub expected_basename: Option<String>,
    /// First image named after the folder
    pub primary_image: Option<PathBuf>,
    /// Structural problem with the folder itself (e.g. no dash in the name)
    pub error: Option<String>,
}

impl DirectoryValidation {
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    /// All four checks passed
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
            && self.has_description
            && self.title.is_some()
            && self.has_images()
            && self.primary_image.is_some()
    }

    /// Failed checks. The title check only counts when there is a text file,
    /// and the matched-image check only when there are images. A folder
    /// whose name gives no basename fails the matched-image check too.
    pub fn missing(&self) -> Vec<MissingReason> {
        let mut reasons = Vec::new();
        if !self.has_description {
            reasons.push(MissingReason::MissingTxt);
        }
        if self.has_description && self.title.is_none() {
            reasons.push(MissingReason::MissingTitle);
        }
        if !self.has_images() {
            reasons.push(MissingReason::MissingImg);
        }
        if self.has_images() && self.primary_image.is_none() {
            reasons.push(MissingReason::MissingMatchedImg);
        }
        reasons
    }
}

/// Folder names grouped by failed check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissingBreakdown {
    pub missing_txt: Vec<String>,
    pub missing_title: Vec<String>,
    pub missing_img: Vec<String>,
    pub missing_matched_img: Vec<String>,
}

/// Folder whose name could not be turned into an image basename
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuralError {
    pub directory: String,
    pub error: String,
}

/// What `validate --json` prints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub valid_directories: Vec<String>,
    pub invalid_directories: Vec<String>,
    #[serde(flatten)]
    pub breakdown: MissingBreakdown,
    pub errors: Vec<StructuralError>,
}

/// Results for every folder under the Images root
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub directories: Vec<DirectoryValidation>,
}

impl ValidationReport {
    pub fn valid(&self) -> impl Iterator<Item = &DirectoryValidation> {
        self.directories.iter().filter(|d| d.is_valid())
    }

    pub fn invalid(&self) -> impl Iterator<Item = &DirectoryValidation> {
        self.directories.iter().filter(|d| !d.is_valid())
    }

    /// Folders with a structural error, with the error text
    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.directories
            .iter()
            .filter_map(|d| d.error.as_deref().map(|e| (d.name.as_str(), e)))
    }

    pub fn breakdown(&self) -> MissingBreakdown {
        let mut breakdown = MissingBreakdown::default();
        for dir in &self.directories {
            for reason in dir.missing() {
                let bucket = match reason {
                    MissingReason::MissingTxt => &mut breakdown.missing_txt,
                    MissingReason::MissingTitle => &mut breakdown.missing_title,
                    MissingReason::MissingImg => &mut breakdown.missing_img,
                    MissingReason::MissingMatchedImg => &mut breakdown.missing_matched_img,
                };
                bucket.push(dir.name.clone());
            }
        }
        breakdown
    }

    /// Serializable view: folder paths, the breakdown and structural errors
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            valid_directories: display_paths(self.valid()),
            invalid_directories: display_paths(self.invalid()),
            breakdown: self.breakdown(),
            errors: self
                .errors()
                .map(|(name, error)| StructuralError {
                    directory: name.to_string(),
                    error: error.to_string(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.summary())?)
    }

    /// Log the counts per bucket
    pub fn log_summary(&self) {
        let breakdown = self.breakdown();
        info!("Valid directories: {}", self.valid().count());
        info!("Invalid directories: {}", self.invalid().count());
        info!("Directories missing matching txt file: {}", breakdown.missing_txt.len());
        info!("Directories with txt file but missing title: {}", breakdown.missing_title.len());
        info!("Directories missing valid images: {}", breakdown.missing_img.len());
        info!(
            "Directories with images but no matching image: {}",
            breakdown.missing_matched_img.len()
        );
        for (name, error) in self.errors() {
            warn!("{}: {}", name, error);
        }
    }
}

fn display_paths<'a>(dirs: impl Iterator<Item = &'a DirectoryValidation>) -> Vec<String> {
    dirs.map(|d| d.path.display().to_string()).collect()
}

/// Immediate subdirectories of `root`, sorted by name ignoring case
pub fn artwork_directories(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(ArtworkError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "images directory not found"),
        ));
    }

    let mut dirs = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by(|a, b| {
            a.file_name()
                .to_string_lossy()
                .to_lowercase()
                .cmp(&b.file_name().to_string_lossy().to_lowercase())
        })
    {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => dirs.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable entry under {}: {}", root.display(), e),
        }
    }
    Ok(dirs)
}

/// Validate every artwork folder under `root`
pub fn validate_root(root: &Path) -> Result<ValidationReport> {
    let directories = artwork_directories(root)?
        .iter()
        .map(|dir| validate_directory(dir))
        .collect();
    Ok(ValidationReport { directories })
}

/// Validate a single artwork folder
pub fn validate_directory(dir: &Path) -> DirectoryValidation {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let description_file = dir.join(format!("{}.txt", name));

    let has_description = description_file.is_file();
    let title = if has_description {
        match fs::read_to_string(&description_file) {
            Ok(text) => extract_title(&text),
            Err(e) => {
                warn!("Error reading {}: {}", description_file.display(), e);
                None
            }
        }
    } else {
        None
    };

    let images = find_images(dir, &description_file);

    let mut expected_basename = None;
    let mut primary_image = None;
    let mut error = None;
    if !images.is_empty() {
        match derive_basename(&name) {
            Ok(basename) => {
                primary_image = match_primary_image(&basename, &images);
                if primary_image.is_none() {
                    debug!("{}: no matching image found for {}", name, basename);
                }
                expected_basename = Some(basename);
            }
            Err(e) => {
                warn!("{}", e);
                error = Some(e.to_string());
            }
        }
    }

    let result = DirectoryValidation {
        name,
        path: dir.to_path_buf(),
        description_file,
        has_description,
        title,
        images,
        expected_basename,
        primary_image,
        error,
    };

    if !result.is_valid() {
        debug!("Directory {} is invalid: {:?}", result.name, result.missing());
    }
    result
}

/// Decodable images directly inside `dir`, excluding the description file
fn find_images(dir: &Path, description_file: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Error listing {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path != description_file)
        .filter(|path| match imaging::probe(path) {
            Ok(info) => {
                debug!("Found image: {:?}, Format: {:?}", path.file_name(), info.format);
                true
            }
            Err(e) => {
                debug!("Error checking {}: {}", path.display(), e);
                false
            }
        })
        .collect()
}

/// First image whose name is `<basename><its own extension>`, ignoring case
pub fn match_primary_image(basename: &str, images: &[PathBuf]) -> Option<PathBuf> {
    images
        .iter()
        .find(|path| {
            let Some(file_name) = path.file_name().map(|n| n.to_string_lossy()) else {
                return false;
            };
            let extension = path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            format!("{}{}", basename, extension).to_lowercase() == file_name.to_lowercase()
        })
        .cloned()
}
