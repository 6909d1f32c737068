/// State management module
///
/// This module handles the artwork catalog store:
/// - Database connection, schema and merge logic (library.rs)
/// - Shared data structures (data.rs)

pub mod data;
pub mod library;

pub use data::{ArtworkRecord, ImageVariant, MergeAction, MergeStats};
pub use library::Library;
