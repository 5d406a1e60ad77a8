// src/matching/validation.rs
//! Completeness checks for certificate data entered by hand.
//!
//! Extraction tolerates partial certificates; sellers typing the fields in a
//! form are held to the full set.

use crate::models::certificate::CertificateFields;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}$").expect("invalid year pattern"));

/// Outcome of [`validate_certificate`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Checks that every certificate field is filled in.
///
/// # Rules
/// - project name must be non-blank
/// - vintage must be exactly four digits
/// - country must be non-blank
/// - methodology must be non-blank
///
/// # Returns
/// A report listing one message per failed rule, in the order above.
pub fn validate_certificate(certificate: &CertificateFields) -> ValidationReport {
    let mut errors = Vec::new();

    if certificate.project_name().is_none() {
        errors.push("Project name is required".to_string());
    }

    match certificate.vintage.as_deref() {
        Some(vintage) if YEAR.is_match(vintage) => {}
        _ => errors.push("Valid vintage year (YYYY) is required".to_string()),
    }

    if certificate.country().is_none() {
        errors.push("Country is required".to_string());
    }

    if certificate.methodology().is_none() {
        errors.push("Methodology is required".to_string());
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}
