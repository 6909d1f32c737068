//! Shared data structures for the artwork catalog
//!
//! These structs represent the data model that flows between
//! the description-file parser and the database layer.

use sha2::{Digest, Sha256};

/// One size variant of an artwork image (small, medium or large)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageVariant {
    /// Web path, e.g. "/images/68-TheChristmasAnimals/LindseyAyres_TheChristmasAnimals-sm.jpg".
    /// Empty when the file does not exist.
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageVariant {
    pub fn is_present(&self) -> bool {
        !self.url.is_empty()
    }
}

/// An artwork as stored in the `artworks` table
#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkRecord {
    /// Unique key in the catalog
    pub title: String,
    pub art_description: String,
    pub dimensions: String,
    pub small_image: ImageVariant,
    pub medium_image: ImageVariant,
    pub large_image: ImageVariant,
    pub link_to_print: String,
    /// ISO date (YYYY-MM-DD), None when unknown
    pub date_produced: Option<String>,
    pub original_price: f64,
    pub for_sale: bool,
    pub location: String,
    pub medium: String,
    /// Comma separated, title-cased, no spaces after commas
    pub categories: String,
    pub is_featured: bool,
}

fn opt_to_string<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

impl ArtworkRecord {
    /// SHA-256 over every field that matters to the website.
    /// Timestamps are left out so an unchanged artwork hashes the same
    /// on every run.
    pub fn content_hash(&self) -> String {
        let variant_parts = |v: &ImageVariant| [v.url.clone(), opt_to_string(&v.width), opt_to_string(&v.height)];

        let mut parts = vec![
            self.title.clone(),
            self.art_description.clone(),
            self.dimensions.clone(),
        ];
        parts.extend(variant_parts(&self.small_image));
        parts.extend(variant_parts(&self.medium_image));
        parts.extend(variant_parts(&self.large_image));
        parts.extend([
            self.link_to_print.clone(),
            opt_to_string(&self.date_produced),
            self.original_price.to_string(),
            self.for_sale.to_string(),
            self.location.clone(),
            self.medium.clone(),
            self.categories.clone(),
            self.is_featured.to_string(),
        ]);

        hex::encode(Sha256::digest(parts.join("|").as_bytes()))
    }
}

/// What the merge did with one artwork
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    Inserted,
    Updated,
    /// Stored content hash already matched
    Skipped,
}

/// Counters for a whole merge run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl MergeStats {
    pub fn record(&mut self, action: MergeAction) {
        match action {
            MergeAction::Inserted => self.inserted += 1,
            MergeAction::Updated => self.updated += 1,
            MergeAction::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.skipped + self.errors
    }
}

#[cfg(test)]
pub(crate) fn sample_record(title: &str) -> ArtworkRecord {
    ArtworkRecord {
        title: title.to_string(),
        art_description: "A unicorn dancing around a maypole".to_string(),
        dimensions: "14\"x17\"".to_string(),
        small_image: ImageVariant::default(),
        medium_image: ImageVariant::default(),
        large_image: ImageVariant {
            url: format!("/images/01-{}/LindseyAyres_{}.jpg", title, title),
            width: Some(1400),
            height: Some(1700),
        },
        link_to_print: String::new(),
        date_produced: Some("2020-01-01".to_string()),
        original_price: 250.0,
        for_sale: true,
        location: "Denver".to_string(),
        medium: "Acrylic".to_string(),
        categories: "Acrylic,Painting".to_string(),
        is_featured: false,
    }
}
