//! Description file field parser
//!
//! The `.txt` files next to each artwork use an ad hoc layout: a field name
//! alone at the start of a line, then its value on indented lines below.
//!
//! ```text
//! Title
//!     The Maypole Unicorn
//!
//! OriginalPrice - Price of the original, not the print
//!     $1,200
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Header line: a run of letters, then end of line or whitespace
static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]+)(?:$|\s(.*))").expect("header regex"));

/// Parsed fields of one description file, keyed by lower-cased field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRecord {
    fields: BTreeMap<String, String>,
}

impl FieldRecord {
    /// Look up a field. `None` means the header never appeared;
    /// `Some("")` means it appeared without content.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Field value, or the empty string when the header is absent
    pub fn text(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Store a field; a later header with the same name replaces the value
    fn insert(&mut self, name: &str, lines: &[String]) {
        let value = lines.join("\n").trim().to_string();
        self.fields.insert(name.to_ascii_lowercase(), value);
    }
}

fn is_indented(line: &str) -> bool {
    line.starts_with('\t') || line.starts_with("    ")
}

/// Parse the text of a description file
///
/// Never fails: a file with no recognizable headers gives an empty record.
pub fn parse_fields(text: &str) -> FieldRecord {
    let mut record = FieldRecord::default();
    let mut current: Option<String> = None;
    let mut content: Vec<String> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        if !is_indented(line) {
            let Some(caps) = HEADER_RE.captures(line.trim_start()) else {
                // Unindented text that is not a header belongs to nothing
                continue;
            };

            if let Some(name) = current.take() {
                record.insert(&name, &content);
                content.clear();
            }

            let name = caps[1].to_string();
            tracing::trace!(field = %name, "found field");

            let remaining = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
            if !remaining.is_empty() && !remaining.starts_with('-') {
                content.push(remaining.to_string());
            }
            current = Some(name);
        } else if current.is_some() {
            content.push(line.trim_start().to_string());
        }
    }

    if let Some(name) = current {
        record.insert(&name, &content);
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_and_multiline_description() {
        let record = parse_fields("Title\n\tFoo Bar\nArtDescription\n\tHello\n\tWorld\n");

        assert_eq!(record.get("title"), Some("Foo Bar"));
        assert_eq!(record.get("artdescription"), Some("Hello\nWorld"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let record = parse_fields("LinkToPrint\n    https://example.com/print\n");
        assert_eq!(record.get("LinkToPrint"), Some("https://example.com/print"));
        assert_eq!(record.get("linktoprint"), Some("https://example.com/print"));
    }

    #[test]
    fn test_header_without_content_is_empty_not_absent() {
        let record = parse_fields("Title\nMedium\n\tAcrylic\n");
        assert_eq!(record.get("title"), Some(""));
        assert_eq!(record.get("medium"), Some("Acrylic"));
        assert_eq!(record.get("location"), None);
    }

    #[test]
    fn test_duplicate_field_keeps_last_value() {
        let record = parse_fields("Title\n\tFirst\nMedium\n\tOil\nTitle\n\tSecond\n");
        assert_eq!(record.get("title"), Some("Second"));
    }

    #[test]
    fn test_blank_lines_do_not_split_fields() {
        let record = parse_fields("ArtDescription\n\tOne\n\n   \n\tTwo\n");
        assert_eq!(record.get("artdescription"), Some("One\nTwo"));
    }

    #[test]
    fn test_inline_content_and_explanatory_text() {
        let text = "Dimensions 14\"x17\"\nOriginalPrice - Price of the original, not the print\n\t$250\n";
        let record = parse_fields(text);
        assert_eq!(record.get("dimensions"), Some("14\"x17\""));
        assert_eq!(record.get("originalprice"), Some("$250"));
    }

    #[test]
    fn test_internal_indentation_is_kept() {
        let record = parse_fields("ArtDescription\n\tLine one\n\t\tnested\n");
        assert_eq!(record.get("artdescription"), Some("Line one\nnested"));

        let record = parse_fields("ArtDescription\n    a  b   c\n");
        assert_eq!(record.get("artdescription"), Some("a  b   c"));
    }

    #[test]
    fn test_no_headers_gives_empty_record() {
        assert!(parse_fields("").is_empty());
        assert!(parse_fields("\tindented with no field\n123 numbers\n").is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let record = parse_fields("Title\r\n\tWindows Art\r\nMedium\r\n\tInk\r\n");
        assert_eq!(record.get("title"), Some("Windows Art"));
        assert_eq!(record.get("medium"), Some("Ink"));
    }

    #[test]
    fn test_text_defaults_to_empty() {
        let record = parse_fields("Title\n\tX\n");
        assert_eq!(record.text("categories"), "");
        assert!(record.contains("title"));
        assert_eq!(record.names().collect::<Vec<_>>(), vec!["title"]);
    }
}
