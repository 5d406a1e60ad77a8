// src/matching/scoring.rs
//! Weighted scoring of a certificate against registry candidates.
//!
//! # Weights
//! | Signal       | Weight | Rule                                          |
//! |--------------|--------|-----------------------------------------------|
//! | project name | 0.50   | Levenshtein similarity, always contributes    |
//! | vintage      | 0.20   | both present and equal as text                |
//! | country      | 0.15   | both present and equal ignoring case          |
//! | methodology  | 0.15   | both present and exactly equal                |
//!
//! The weights sum to 1, so a perfect match scores 1.

use crate::matching::similarity::similarity;
use crate::models::authentication::AuthenticationResult;
use crate::models::certificate::CertificateFields;
use crate::models::listing::ListingCandidate;
use log::debug;

pub const NAME_WEIGHT: f64 = 0.50;
pub const VINTAGE_WEIGHT: f64 = 0.20;
pub const COUNTRY_WEIGHT: f64 = 0.15;
pub const METHODOLOGY_WEIGHT: f64 = 0.15;

/// Scores a single candidate against the certificate.
///
/// # Returns
/// A score in `[0, 1]`. A candidate without a project record is compared
/// as if every project field were missing.
pub fn score_candidate(certificate: &CertificateFields, candidate: &ListingCandidate) -> f64 {
    let project = candidate.project();
    let project_name = project.and_then(|p| p.name.as_deref()).unwrap_or("");

    let mut score = similarity(certificate.project_name().unwrap_or(""), project_name) * NAME_WEIGHT;

    let project_vintage = project.and_then(|p| p.vintage_text());
    if let (Some(ours), Some(theirs)) = (certificate.vintage(), project_vintage.as_deref()) {
        if ours == theirs {
            score += VINTAGE_WEIGHT;
        }
    }

    let project_country = project.and_then(|p| p.country.as_deref());
    if let (Some(ours), Some(theirs)) = (certificate.country(), project_country) {
        if ours.to_lowercase() == theirs.to_lowercase() {
            score += COUNTRY_WEIGHT;
        }
    }

    let project_methodology = project.and_then(|p| p.methodology.as_deref());
    if let (Some(ours), Some(theirs)) = (certificate.methodology(), project_methodology) {
        if ours == theirs {
            score += METHODOLOGY_WEIGHT;
        }
    }

    score.clamp(0.0, 1.0)
}

/// Finds the best-scoring candidate.
///
/// Candidates are scanned in order and only a strictly higher score replaces
/// the current best, so ties go to the earliest candidate. Candidates scoring
/// zero never match.
///
/// # Returns
/// - `Some((candidate, score))` for the winner
/// - `None` if the list is empty or every candidate scored zero
pub fn best_match<'a>(
    certificate: &CertificateFields,
    candidates: &'a [ListingCandidate],
) -> Option<(&'a ListingCandidate, f64)> {
    let mut best: Option<(&ListingCandidate, f64)> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        let score = score_candidate(certificate, candidate);
        debug!(
            "candidate #{} ({}) scored {:.4}",
            index,
            candidate.credit_id.as_deref().unwrap_or("no credit id"),
            score
        );

        let best_score = best.map(|(_, s)| s).unwrap_or(0.0);
        if score > best_score {
            best = Some((candidate, score));
        }
    }

    best
}

/// Authenticates a certificate against a list of registry candidates.
///
/// # Returns
/// The [`AuthenticationResult`] for the best candidate; an empty list gives
/// [`AuthenticationResult::unmatched`].
pub fn authenticate_certificate(
    certificate: &CertificateFields,
    candidates: &[ListingCandidate],
) -> AuthenticationResult {
    AuthenticationResult::from_best_match(best_match(certificate, candidates))
}
