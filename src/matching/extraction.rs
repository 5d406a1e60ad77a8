// src/matching/extraction.rs
//! Field extraction from certificate text.
//!
//! Certificates are issued by different registries but all carry labelled
//! lines such as `Project Name: ...` or `Vintage Year: 2023`. Each field has
//! its own case-insensitive pattern and is looked up independently.

use crate::models::certificate::CertificateFields;
use once_cell::sync::Lazy;
use regex::Regex;

static PROJECT_NAME: Lazy<Regex> = Lazy::new(|| label_pattern(r"Project Name:\s*(.+)"));
static VINTAGE: Lazy<Regex> = Lazy::new(|| label_pattern(r"Vintage Year:\s*([0-9]{4})"));
static COUNTRY: Lazy<Regex> = Lazy::new(|| label_pattern(r"Country:\s*(.+)"));
static METHODOLOGY: Lazy<Regex> = Lazy::new(|| label_pattern(r"Methodology:\s*(.+)"));

fn label_pattern(pattern: &str) -> Regex {
    // Patterns are literals above; a failure here is a programming error.
    Regex::new(&format!("(?i){pattern}")).expect("invalid certificate field pattern")
}

/// Extracts the labelled certificate fields from raw text.
///
/// # Arguments
/// * `text` - Text layer of the certificate (PDF text or pasted content)
///
/// # Returns
/// A sparse [`CertificateFields`]: the first match of each label, trimmed.
/// Labels that are missing, or whose value is blank, leave the field unset.
///
/// # Notes
/// Whitespace between a label and its value may include line breaks, so a
/// value printed on the line after its label is still picked up.
pub fn extract_certificate_fields(text: &str) -> CertificateFields {
    CertificateFields {
        project_name: capture(&PROJECT_NAME, text),
        vintage: capture(&VINTAGE, text),
        country: capture(&COUNTRY, text),
        methodology: capture(&METHODOLOGY, text),
    }
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CERTIFICATE: &str = "\
VERIFIED CARBON UNIT CERTIFICATE
Project Name:   Amazon Rainforest Conservation  
Vintage Year: 2023
Country: Brazil
Methodology: VM0015
Quantity: 1,000 tCO2e
";

    #[test]
    fn test_extracts_all_fields() {
        let fields = extract_certificate_fields(CERTIFICATE);

        assert_eq!(fields.project_name.as_deref(), Some("Amazon Rainforest Conservation"));
        assert_eq!(fields.vintage.as_deref(), Some("2023"));
        assert_eq!(fields.country.as_deref(), Some("Brazil"));
        assert_eq!(fields.methodology.as_deref(), Some("VM0015"));
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let fields = extract_certificate_fields("PROJECT NAME: Solar Farm Alpha\nvintage year: 2019");

        assert_eq!(fields.project_name.as_deref(), Some("Solar Farm Alpha"));
        assert_eq!(fields.vintage.as_deref(), Some("2019"));
        assert_eq!(fields.country, None);
        assert_eq!(fields.methodology, None);
    }

    #[test]
    fn test_vintage_requires_four_digits() {
        let fields = extract_certificate_fields("Vintage Year: 23");
        assert_eq!(fields.vintage, None);

        let fields = extract_certificate_fields("Vintage Year: 20231");
        assert_eq!(fields.vintage.as_deref(), Some("2023"));
    }

    #[test]
    fn test_value_on_following_line() {
        let fields = extract_certificate_fields("Country:\n  Kenya\n");
        assert_eq!(fields.country.as_deref(), Some("Kenya"));
    }

    #[test]
    fn test_first_match_wins() {
        let fields = extract_certificate_fields("Country: Peru\nCountry: Chile");
        assert_eq!(fields.country.as_deref(), Some("Peru"));
    }

    #[test]
    fn test_no_labels_yields_empty_record() {
        let fields = extract_certificate_fields("This document certifies nothing in particular.");
        assert!(fields.is_empty());
        assert_eq!(fields, CertificateFields::default());
    }

    #[test]
    fn test_blank_value_is_left_unset() {
        let fields = extract_certificate_fields("Methodology:  \t");
        assert_eq!(fields.methodology, None);
    }
}
