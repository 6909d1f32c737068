//! Error types shared by every tool in the crate
//!
//! Per-file problems (a corrupt image, an unreadable text file) are usually
//! caught where they happen and logged; the variants here are the ones that
//! either abort a single artwork directory or the whole command.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while working on the artwork folders
#[derive(Debug, Error)]
pub enum ArtworkError {
    /// Folder name has no `-` between the number and the free text,
    /// so no image basename can be derived from it
    #[error("directory name '{name}' has no '-' separating the number from the title")]
    MissingSeparator { name: String },

    /// Ratio query with a zero height
    #[error("cannot compute a ratio with zero height (width {width})")]
    ZeroHeight { width: f64 },

    /// Ratio query with a negative, zero-width or non-finite dimension
    #[error("invalid dimensions for ratio query: {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },

    /// Description file parsed but has no usable title
    #[error("no title found in {}", .path.display())]
    MissingTitle { path: PathBuf },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a recognized image format", .path.display())]
    NotAnImage { path: PathBuf },

    #[error("failed to decode image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ArtworkError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArtworkError::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap an image error with the path it happened on
    pub fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        ArtworkError::Image {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ArtworkError>;
