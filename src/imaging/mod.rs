//! Image handling module
//!
//! This module handles:
//! - Checking whether a file is a decodable raster image (probe.rs)
//! - Reading pixel dimensions (probe.rs)
//! - Generating the -sm and -med web variants (thumbnail.rs)

pub mod probe;
pub mod thumbnail;

pub use probe::{dimensions, probe, ImageInfo};
