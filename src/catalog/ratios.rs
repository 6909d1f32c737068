//! Print-size ratio matching
//!
//! The print shop sells a fixed list of sizes. Given the pixel size of an
//! artwork we list every catalog size whose aspect ratio is within 2% of the
//! artwork's, so the description file can say which prints will not crop.

use crate::error::{ArtworkError, Result};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

/// Maximum relative ratio difference for a print size to count as a match
pub const RATIO_TOLERANCE: f64 = 0.02;

/// A print size in inches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintSize {
    pub width: f64,
    pub height: f64,
}

impl PrintSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Order by width, then height
    fn cmp_dimensions(&self, other: &Self) -> Ordering {
        self.width
            .total_cmp(&other.width)
            .then(self.height.total_cmp(&other.height))
    }
}

impl fmt::Display for PrintSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_size(self.width, self.height))
    }
}

/// Catalog sizes grouped under a label; the grouping is for reading only
#[derive(Debug)]
pub struct PrintSizeGroup {
    pub label: &'static str,
    pub sizes: &'static [PrintSize],
}

const fn ps(width: f64, height: f64) -> PrintSize {
    PrintSize::new(width, height)
}

/// Every print size the shop offers
pub static PRINT_SIZE_CATALOG: &[PrintSizeGroup] = &[
    PrintSizeGroup {
        label: "1:1",
        sizes: &[
            ps(6.0, 6.0), ps(8.0, 8.0), ps(10.0, 10.0), ps(12.0, 12.0), ps(14.0, 14.0),
            ps(16.0, 16.0), ps(18.0, 18.0), ps(20.0, 20.0), ps(23.0, 23.0), ps(24.0, 24.0),
            ps(28.0, 28.0), ps(30.0, 30.0), ps(32.0, 32.0), ps(36.0, 36.0), ps(40.0, 40.0),
        ],
    },
    PrintSizeGroup {
        label: "2:3",
        sizes: &[
            ps(4.0, 6.0), ps(8.0, 12.0), ps(12.0, 18.0), ps(16.0, 24.0), ps(20.0, 30.0),
            ps(24.0, 36.0), ps(32.0, 48.0), ps(36.0, 54.0), ps(40.0, 60.0), ps(18.0, 27.0),
        ],
    },
    PrintSizeGroup {
        label: "3:4",
        sizes: &[
            ps(6.0, 8.0), ps(9.0, 12.0), ps(12.0, 16.0), ps(18.0, 24.0), ps(24.0, 32.0),
            ps(30.0, 40.0), ps(36.0, 48.0),
        ],
    },
    PrintSizeGroup {
        label: "4:5",
        sizes: &[
            ps(8.0, 10.0), ps(12.0, 15.0), ps(16.0, 20.0), ps(20.0, 25.0), ps(24.0, 30.0),
            ps(36.0, 45.0), ps(40.0, 50.0),
        ],
    },
    PrintSizeGroup {
        label: "Other",
        sizes: &[
            ps(3.0, 7.0), ps(4.0, 10.0), ps(5.0, 7.0), ps(5.0, 10.0), ps(5.0, 12.0),
            ps(6.8, 16.0), ps(6.0, 12.0), ps(8.0, 20.0), ps(8.0, 24.0), ps(8.0, 28.0),
            ps(8.5, 11.0), ps(9.0, 11.0), ps(9.0, 18.0), ps(10.0, 13.0), ps(10.0, 17.0),
            ps(10.0, 20.0), ps(10.0, 24.0), ps(10.0, 30.0), ps(10.0, 36.0), ps(11.0, 14.0),
            ps(11.0, 17.0), ps(11.0, 22.0), ps(12.0, 14.0), ps(12.0, 20.0), ps(12.0, 24.0),
            ps(12.0, 30.0), ps(12.0, 36.0), ps(13.0, 17.0), ps(13.0, 19.0), ps(14.0, 18.0),
            ps(14.0, 20.0), ps(14.0, 23.0), ps(14.0, 24.0), ps(14.0, 28.0), ps(14.0, 36.0),
            ps(14.0, 50.0), ps(15.0, 30.0), ps(16.0, 22.0), ps(16.0, 27.0), ps(16.0, 30.0),
            ps(16.0, 32.0), ps(16.0, 36.0), ps(16.0, 37.0), ps(16.0, 48.0), ps(17.0, 20.0),
            ps(17.0, 23.0), ps(18.0, 20.0), ps(18.0, 22.0), ps(18.0, 26.0), ps(18.0, 30.0),
            ps(18.0, 36.0), ps(18.0, 43.0), ps(18.0, 45.0), ps(18.0, 47.0), ps(18.0, 50.0),
            ps(18.0, 54.0), ps(19.0, 27.0), ps(20.0, 24.0), ps(20.0, 26.0), ps(20.0, 28.0),
            ps(20.0, 33.0), ps(20.0, 36.0), ps(21.0, 30.0), ps(20.0, 40.0), ps(20.0, 60.0),
            ps(22.0, 28.0), ps(22.0, 30.0), ps(22.0, 34.0), ps(22.0, 36.0), ps(24.0, 28.0),
            ps(24.0, 38.0), ps(24.0, 40.0), ps(24.0, 45.0), ps(24.0, 48.0), ps(24.0, 56.0),
            ps(24.0, 60.0), ps(24.0, 65.0), ps(24.0, 90.0), ps(26.0, 34.0), ps(26.0, 40.0),
            ps(27.0, 30.0), ps(27.0, 40.0), ps(28.0, 36.0), ps(28.0, 38.0), ps(28.0, 40.0),
            ps(28.0, 48.0), ps(30.0, 50.0), ps(30.0, 60.0), ps(30.0, 75.0), ps(32.0, 42.0),
            ps(32.0, 44.0), ps(32.0, 54.0), ps(36.0, 40.0), ps(36.0, 50.0), ps(36.0, 60.0),
            ps(36.0, 70.0), ps(5.1, 7.1), ps(7.9, 9.8), ps(17.7, 23.6), ps(23.6, 35.4),
            ps(39.4, 55.1),
        ],
    },
];

/// All catalog sizes, ignoring the grouping
pub fn all_print_sizes() -> impl Iterator<Item = &'static PrintSize> {
    PRINT_SIZE_CATALOG.iter().flat_map(|group| group.sizes.iter())
}

/// Result of a ratio query
#[derive(Debug, Clone, PartialEq)]
pub struct RatioMatch {
    /// The query reduced to whole numbers, e.g. 1200x1800 -> (2, 3). Display only.
    pub simplified: (u64, u64),
    /// Matching sizes, unique, ordered by width then height
    pub sizes: Vec<PrintSize>,
}

impl RatioMatch {
    /// Sizes formatted as "WxH"
    pub fn labels(&self) -> Vec<String> {
        self.sizes.iter().map(PrintSize::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

/// "4x6" for whole numbers, "6.8x16" otherwise
pub fn format_size(width: f64, height: f64) -> String {
    format!("{}x{}", format_dimension(width), format_dimension(height))
}

fn format_dimension(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn check_dimensions(width: f64, height: f64) -> Result<()> {
    if height == 0.0 {
        return Err(ArtworkError::ZeroHeight { width });
    }
    if !width.is_finite() || !height.is_finite() || width <= 0.0 || height < 0.0 {
        return Err(ArtworkError::InvalidDimensions { width, height });
    }
    Ok(())
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Reduce a width/height pair to its smallest whole-number ratio.
/// Dimensions are scaled by 10 first so one decimal place survives.
pub fn simplify_ratio(width: f64, height: f64) -> Result<(u64, u64)> {
    check_dimensions(width, height)?;

    let w = (width * 10.0).round() as u64;
    let h = (height * 10.0).round() as u64;
    let divisor = gcd(w, h);
    if divisor == 0 {
        return Err(ArtworkError::InvalidDimensions { width, height });
    }

    Ok((w / divisor, h / divisor))
}

/// Relative error of `ratio` against `query_ratio`, at most [`RATIO_TOLERANCE`].
/// An error of exactly 2% counts, even after float rounding.
fn within_tolerance(query_ratio: f64, ratio: f64) -> bool {
    (query_ratio - ratio).abs() / query_ratio <= RATIO_TOLERANCE + f64::EPSILON
}

/// Find every catalog print size whose ratio is within [`RATIO_TOLERANCE`]
/// of `width / height`
pub fn match_ratio(width: f64, height: f64) -> Result<RatioMatch> {
    let simplified = simplify_ratio(width, height)?;
    let query_ratio = width / height;

    let mut seen = HashSet::new();
    let mut sizes: Vec<PrintSize> = all_print_sizes()
        .filter(|size| within_tolerance(query_ratio, size.ratio()))
        .filter(|size| seen.insert(size.to_string()))
        .copied()
        .collect();
    sizes.sort_by(PrintSize::cmp_dimensions);

    Ok(RatioMatch { simplified, sizes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(4.0, 6.0), "4x6");
        assert_eq!(format_size(6.8, 16.0), "6.8x16");
        assert_eq!(format_size(17.7, 23.6), "17.7x23.6");
    }

    #[test]
    fn test_catalog_is_complete() {
        assert_eq!(all_print_sizes().count(), 140);
        assert!(all_print_sizes().all(|s| s.width > 0.0 && s.height > 0.0));
    }

    #[test]
    fn test_simplify_ratio() {
        assert_eq!(simplify_ratio(1200.0, 1800.0).unwrap(), (2, 3));
        assert_eq!(simplify_ratio(8.5, 11.0).unwrap(), (17, 22));
        assert_eq!(simplify_ratio(1000.0, 1000.0).unwrap(), (1, 1));
    }

    #[test]
    fn test_two_by_three_matches() {
        let result = match_ratio(1200.0, 1800.0).unwrap();

        assert_eq!(result.simplified, (2, 3));
        assert_eq!(
            result.labels(),
            vec![
                "4x6", "8x12", "12x18", "16x24", "18x27", "20x30", "23.6x35.4", "24x36", "27x40",
                "32x48", "36x54", "40x60",
            ]
        );

        // every catalog size within 2% is returned, nothing else
        let query = 1200.0 / 1800.0;
        let expected: HashSet<String> = all_print_sizes()
            .filter(|size| (query - size.ratio()).abs() / query <= RATIO_TOLERANCE)
            .map(PrintSize::to_string)
            .collect();
        let returned: HashSet<String> = result.labels().into_iter().collect();
        assert_eq!(returned, expected);
    }

    #[test]
    fn test_tolerance_boundary() {
        // 100x98 is exactly 2% away from square
        let at_limit = match_ratio(100.0, 98.0).unwrap().labels();
        assert!(at_limit.contains(&"12x12".to_string()));
        assert!(at_limit.contains(&"40x40".to_string()));

        let past_limit = match_ratio(100.0, 97.9).unwrap().labels();
        assert!(!past_limit.contains(&"12x12".to_string()));
    }

    #[test]
    fn test_matches_are_sorted_and_unique() {
        let result = match_ratio(3000.0, 3000.0).unwrap();
        let labels = result.labels();

        assert_eq!(labels.first().map(String::as_str), Some("6x6"));
        assert_eq!(labels.last().map(String::as_str), Some("40x40"));
        for pair in result.sizes.windows(2) {
            assert!(pair[0].cmp_dimensions(&pair[1]) == Ordering::Less);
        }
        let unique: HashSet<_> = labels.iter().collect();
        assert_eq!(unique.len(), labels.len());
    }

    #[test]
    fn test_no_match_for_extreme_ratio() {
        let result = match_ratio(100.0, 1000.0).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.simplified, (1, 10));
    }

    #[test]
    fn test_zero_height_is_an_error() {
        assert!(matches!(
            match_ratio(1200.0, 0.0),
            Err(ArtworkError::ZeroHeight { .. })
        ));
        assert!(matches!(
            simplify_ratio(5.0, 0.0),
            Err(ArtworkError::ZeroHeight { .. })
        ));
    }

    #[test]
    fn test_invalid_dimensions_are_errors() {
        assert!(matches!(
            match_ratio(0.0, 10.0),
            Err(ArtworkError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            match_ratio(f64::NAN, 10.0),
            Err(ArtworkError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            match_ratio(-4.0, 6.0),
            Err(ArtworkError::InvalidDimensions { .. })
        ));
    }
}
