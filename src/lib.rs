//! Tools for the artwork catalog: validate the images directory, match
//! print sizes by aspect ratio and merge artworks into the store.

pub mod catalog;
pub mod config;
pub mod error;
pub mod imaging;
pub mod state;

pub use error::{ArtworkError, Result};
