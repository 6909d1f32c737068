//! Fill in empty `Title` fields from the folder name
//!
//! `33-The_Witches/33-The_Witches.txt` with an empty `Title` gets
//! `\tThe Witches` written under the header.

use super::transform::title_from_directory_name;
use super::validator::{validate_root, MissingReason};
use crate::error::{ArtworkError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

static HEADER_LIKE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]+($|\s)").expect("header regex"));

/// Insert `title` under every `Title` header line.
/// A non-header content line right after the header is replaced.
/// Returns None when the text has no `Title` header.
pub fn insert_title(text: &str, title: &str) -> Option<String> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut out = String::with_capacity(text.len() + title.len() + 2);
    let mut updated = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        out.push_str(line);
        if !line.ends_with('\n') {
            out.push('\n');
        }

        if line.trim() == "Title" {
            out.push('\t');
            out.push_str(title);
            out.push('\n');
            updated = true;

            if let Some(next) = lines.get(i + 1) {
                let next = next.trim();
                if !next.is_empty() && !HEADER_LIKE_RE.is_match(next) {
                    i += 1;
                }
            }
        }
        i += 1;
    }

    updated.then_some(out)
}

/// Write a title derived from the folder name into one description file
pub fn fix_title(description_file: &Path, title: &str, dry_run: bool) -> Result<bool> {
    let text = fs::read_to_string(description_file)
        .map_err(|e| ArtworkError::io(description_file, e))?;

    let name = description_file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let Some(updated) = insert_title(&text, title) else {
        warn!("✗ Could not update: {} (Title field not found)", name);
        return Ok(false);
    };

    if dry_run {
        info!("[DRY RUN] Would set title of {} to '{}'", name, title);
    } else {
        fs::write(description_file, updated).map_err(|e| ArtworkError::io(description_file, e))?;
        info!("✓ Updated: {} with title '{}'", name, title);
    }
    Ok(true)
}

/// Fix every folder under `root` whose description file lacks a title.
/// Returns the description files that were (or would be) updated.
pub fn fix_missing_titles(root: &Path, dry_run: bool) -> Result<Vec<PathBuf>> {
    let report = validate_root(root)?;
    let mut fixed = Vec::new();

    for dir in report
        .directories
        .iter()
        .filter(|d| d.missing().contains(&MissingReason::MissingTitle))
    {
        let title = title_from_directory_name(&dir.name);
        match fix_title(&dir.description_file, &title, dry_run) {
            Ok(true) => fixed.push(dir.description_file.clone()),
            Ok(false) => {}
            Err(e) => warn!("{}", e),
        }
    }

    Ok(fixed)
}
