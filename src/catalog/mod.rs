/// Artwork catalog module
///
/// This module covers everything that reads the images directory:
/// - Description file parsing (fields.rs) and value cleanup (transform.rs)
/// - Print size matching by aspect ratio (ratios.rs)
/// - Folder validation and reporting (validator.rs)
/// - Record assembly for the store (artwork.rs)
/// - In-place edits of description files (annotate.rs, titles.rs)

pub mod annotate;
pub mod artwork;
pub mod fields;
pub mod ratios;
pub mod titles;
pub mod transform;
pub mod validator;

pub use artwork::process_artwork_directory;
pub use fields::{parse_fields, FieldRecord};
pub use ratios::{match_ratio, simplify_ratio, RatioMatch};
pub use validator::{validate_directory, validate_root, DirectoryValidation, ReportSummary, ValidationReport};
