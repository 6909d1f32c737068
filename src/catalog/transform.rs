//! Conversions from raw field text to the values stored in the catalog

use chrono::NaiveDate;
use tracing::warn;

/// Price words that mean "no price"
const NO_PRICE_WORDS: [&str; 4] = ["sold", "not for sale", "n/a", "na"];

/// Date layouts the catalog accepts besides a bare year
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a price such as "$1,200" into a number
///
/// "Sold", "Not for sale", "N/A" and unparseable text all give 0.
pub fn parse_price(raw: &str) -> f64 {
    let cleaned = raw.replace(&['$', ','][..], "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return 0.0;
    }

    let lower = cleaned.to_lowercase();
    if NO_PRICE_WORDS.contains(&lower.as_str()) {
        return 0.0;
    }

    match cleaned.parse::<f64>() {
        Ok(price) if price.is_finite() => price,
        _ => {
            warn!("Could not parse price '{}'", raw.trim());
            0.0
        }
    }
}

/// Whether the original is for sale, judged from the raw price text
pub fn determine_for_sale(raw: &str) -> bool {
    if raw.trim().is_empty() {
        return false;
    }

    let lower = raw.to_lowercase();
    if lower.contains("sold") || lower.contains("not for sale") {
        return false;
    }

    parse_price(raw) > 0.0
}

/// Normalize a category list: "acrylic, paint pouring" -> "Acrylic,Paint Pouring"
pub fn format_categories(raw: &str) -> String {
    raw.split(',')
        .map(str::trim)
        .filter(|category| !category.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(",")
}

/// Upper-case the first letter of every word, lower-case the rest.
/// A word starts at any letter not preceded by another letter.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;

    for ch in text.chars() {
        if prev_is_letter {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        prev_is_letter = ch.is_alphabetic();
    }

    out
}

/// Convert the DateProduced text into an ISO date
///
/// A bare year becomes January 1st of that year. Full dates in a layout the
/// catalog understands are normalized; anything else is dropped with a warning.
pub fn parse_date_produced(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(format!("{:04}-01-01", year));
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }

    warn!("Could not parse date '{}'", trimmed);
    None
}

/// "33-The_Witches" -> "The Witches"
pub fn title_from_directory_name(name: &str) -> String {
    let without_number = match name.split_once('-') {
        Some((prefix, rest)) if prefix.chars().all(|c| c.is_ascii_digit()) => rest,
        _ => name,
    };
    without_number.replace('_', " ").trim().to_string()
}
