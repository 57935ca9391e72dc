//! BibTeX citation formatting.
//!
//! Converts raw publication records into `@article` entries. Conversion is
//! pure and deterministic: the same record always renders the same bytes.
//!
//! Citation keys have the shape `{surname}{year}_{hash4}` where `hash4` is
//! the first 4 hex characters of the MD5 digest of the exact title string.

use crate::error::{OptionExt, Result};
use crate::serpapi::Publication;

/// Sentinel year for records that carry none
const UNKNOWN_YEAR: &str = "XXXX";

/// Hex characters of the title digest kept in the citation key
const KEY_HASH_LEN: usize = 4;

/// Derive the citation key for an entry.
///
/// The surname is the last whitespace-delimited token of the primary author
/// (the segment before the first comma of `authors`), lower-cased. Keys are
/// not guaranteed globally unique; surname, year and hash fragment can all
/// collide.
pub fn citation_key(title: &str, authors: &str, year: &str) -> Result<String> {
    let first_author = authors.split(',').next().unwrap_or_default().trim();
    let surname = first_author
        .split_whitespace()
        .last()
        .ok_or_data("Publication record has no parsable author name")?
        .to_lowercase();

    let digest = format!("{:x}", md5::compute(title.as_bytes()));
    let fragment = &digest[..KEY_HASH_LEN];

    Ok(format!("{}{}_{}", surname, year, fragment))
}

/// Render one publication record as a BibTeX `@article` entry.
///
/// Field order is fixed: title, author, year, then journal, note and url when
/// present. Every line but the closing brace ends with a trailing comma.
///
/// # Errors
///
/// A record missing `title` or `authors` (absent or empty) is a data fault.
pub fn format_entry(record: &Publication) -> Result<String> {
    let title = record
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_data("Publication record is missing a title")?;
    let authors = record
        .authors
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .ok_or_data("Publication record is missing authors")?;
    let year = record.year.as_deref().unwrap_or(UNKNOWN_YEAR);

    let key = citation_key(title, authors, year)?;

    // Two independent single-character passes; a title that already contains
    // an escaped brace gets escaped again.
    let escaped_title = title.replace('{', "\\{").replace('}', "\\}");

    // Naive substring replacement, applied to every occurrence.
    let author_list = authors.replace(" and ", " AND ");

    let mut lines = vec![
        format!("@article{{{},", key),
        format!("  title = {{{}}},", escaped_title),
        format!("  author = {{{}}},", author_list),
        format!("  year = {{{}}},", year),
    ];

    if let Some(venue) = &record.publication {
        lines.push(format!("  journal = {{{}}},", venue));
    }

    if let Some(cited_by) = &record.cited_by {
        lines.push(format!("  note = {{Cited by {}}},", cited_by.value));
    }

    if let Some(link) = &record.link {
        lines.push(format!("  url = {{{}}},", link));
    }

    lines.push("}".to_string());

    Ok(lines.join("\n"))
}

/// Render the full bibliography: entries in input order, blank-line separated.
///
/// # Errors
///
/// One malformed record fails the whole batch; no partial output is produced.
pub fn render_bibliography(records: &[Publication]) -> Result<String> {
    let entries = records
        .iter()
        .map(format_entry)
        .collect::<Result<Vec<_>>>()?;

    Ok(entries.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serpapi::CitedBy;

    fn record(title: &str, authors: &str, year: Option<&str>) -> Publication {
        Publication {
            title: Some(title.to_string()),
            authors: Some(authors.to_string()),
            year: year.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_citation_key_shape() {
        // md5("Deep Learning") = 6a68b641...
        let key = citation_key("Deep Learning", "Jane Q. Smith, Bob Lee", "2020")
            .expect("Key derivation failed");
        assert_eq!(key, "smith2020_6a68");
    }

    #[test]
    fn test_citation_key_unknown_year() {
        let key = citation_key("Deep Learning", "Jane Q. Smith", UNKNOWN_YEAR)
            .expect("Key derivation failed");
        assert_eq!(key, "smithXXXX_6a68");
    }

    #[test]
    fn test_citation_key_unparsable_author() {
        assert!(citation_key("Deep Learning", "   ", "2020").is_err());
        assert!(citation_key("Deep Learning", ", Bob Lee", "2020").is_err());
    }

    #[test]
    fn test_minimal_entry() {
        let entry = format_entry(&record("Deep Learning", "Jane Q. Smith, Bob Lee", Some("2020")))
            .expect("Format failed");
        assert_eq!(
            entry,
            "@article{smith2020_6a68,\n\
             \x20 title = {Deep Learning},\n\
             \x20 author = {Jane Q. Smith, Bob Lee},\n\
             \x20 year = {2020},\n\
             }"
        );
    }

    #[test]
    fn test_full_entry_field_order() {
        let mut publication = record(
            "Attention Is All You Need",
            "Ashish Vaswani, Noam Shazeer",
            Some("2017"),
        );
        publication.publication = Some("NeurIPS".to_string());
        publication.cited_by = Some(CitedBy { value: 100000 });
        publication.link = Some("https://example.org/attention".to_string());

        let entry = format_entry(&publication).expect("Format failed");
        // md5("Attention Is All You Need") = 70765ea7...
        assert_eq!(
            entry,
            "@article{vaswani2017_7076,\n\
             \x20 title = {Attention Is All You Need},\n\
             \x20 author = {Ashish Vaswani, Noam Shazeer},\n\
             \x20 year = {2017},\n\
             \x20 journal = {NeurIPS},\n\
             \x20 note = {Cited by 100000},\n\
             \x20 url = {https://example.org/attention},\n\
             }"
        );
    }

    #[test]
    fn test_and_substitution_every_occurrence() {
        let entry = format_entry(&record(
            "Deep Learning",
            "Jane Smith and Bob Lee and Ann Fandango",
            Some("2020"),
        ))
        .expect("Format failed");
        assert!(entry.contains("author = {Jane Smith AND Bob Lee AND Ann Fandango},"));
    }

    #[test]
    fn test_brace_escaping() {
        // md5("Set {A} and {B}") = 5447306b...
        let entry = format_entry(&record("Set {A} and {B}", "Jane Smith", Some("2021")))
            .expect("Format failed");
        assert!(entry.starts_with("@article{smith2021_5447,"));
        assert!(entry.contains("title = {Set \\{A\\} and \\{B\\}},"));
    }

    #[test]
    fn test_brace_escaping_is_not_idempotent() {
        // A pre-escaped brace is escaped again: \{ becomes \\{
        let entry = format_entry(&record("Already \\{escaped\\}", "Jane Smith", Some("2021")))
            .expect("Format failed");
        assert!(entry.contains("title = {Already \\\\{escaped\\\\}},"));
        // The key hashes the raw title, before escaping
        assert!(entry.starts_with("@article{smith2021_7ee7,"));
    }

    #[test]
    fn test_year_defaults_to_sentinel() {
        let entry =
            format_entry(&record("Deep Learning", "Jane Q. Smith", None)).expect("Format failed");
        assert!(entry.starts_with("@article{smithXXXX_6a68,"));
        assert!(entry.contains("year = {XXXX},"));
    }

    #[test]
    fn test_missing_title_is_data_fault() {
        let publication = Publication {
            authors: Some("Jane Smith".to_string()),
            ..Default::default()
        };
        assert!(format_entry(&publication).is_err());
    }

    #[test]
    fn test_missing_authors_is_data_fault() {
        let publication = Publication {
            title: Some("Deep Learning".to_string()),
            authors: Some("".to_string()),
            ..Default::default()
        };
        assert!(format_entry(&publication).is_err());
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let publication = record("Deep Learning", "Jane Q. Smith, Bob Lee", Some("2020"));
        let first = format_entry(&publication).expect("Format failed");
        let second = format_entry(&publication).expect("Format failed");
        assert_eq!(first, second);
    }

    #[test]
    fn test_bibliography_blank_line_separated() {
        let records = vec![
            record("Deep Learning", "Jane Q. Smith", Some("2020")),
            record("Attention Is All You Need", "Ashish Vaswani", Some("2017")),
        ];
        let bibliography = render_bibliography(&records).expect("Render failed");
        assert_eq!(bibliography.matches("\n\n").count(), 1);
        assert!(bibliography.starts_with("@article{smith2020_6a68,"));
        assert!(bibliography.ends_with("}"));
        assert!(!bibliography.ends_with("\n"));
    }

    #[test]
    fn test_bibliography_one_bad_record_fails_batch() {
        let records = vec![
            record("Deep Learning", "Jane Q. Smith", Some("2020")),
            Publication::default(),
        ];
        assert!(render_bibliography(&records).is_err());
    }
}
