// src/models/authentication.rs
//! Authentication result data model.
//!
//! This is the stable shape the "list credit" flow consumes after a
//! certificate has been checked against the registry.

use crate::models::listing::ListingCandidate;
use crate::models::listing::ProjectRecord;
use serde::{Deserialize, Serialize};

/// Minimum confidence for a certificate to count as authentic.
pub const AUTHENTICATION_THRESHOLD: f64 = 0.75;

/// Outcome of matching a certificate against registry listings.
///
/// # Invariants
/// - `authenticated` is `true` iff `confidence >= AUTHENTICATION_THRESHOLD`
/// - `confidence` lies in `[0, 1]` and carries two decimals
/// - `matched_credit_id` / `matched_project` are only set when some
///   candidate scored above zero
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AuthenticationResult {
    pub authenticated: bool,
    pub confidence: f64,
    pub matched_credit_id: Option<String>,
    pub matched_project: Option<ProjectRecord>,
}

impl AuthenticationResult {
    /// The result reported when nothing could be matched.
    pub fn unmatched() -> Self {
        AuthenticationResult {
            authenticated: false,
            confidence: 0.0,
            matched_credit_id: None,
            matched_project: None,
        }
    }

    /// Builds a result from the best candidate and its raw score.
    ///
    /// The decision is taken on the rounded confidence so the reported
    /// number and the verdict can never disagree.
    pub fn from_best_match(best: Option<(&ListingCandidate, f64)>) -> Self {
        match best {
            Some((candidate, score)) => {
                let confidence = round_confidence(score);
                AuthenticationResult {
                    authenticated: confidence >= AUTHENTICATION_THRESHOLD,
                    confidence,
                    matched_credit_id: candidate.credit_id.clone(),
                    matched_project: candidate.project.clone(),
                }
            }
            None => Self::unmatched(),
        }
    }
}

/// Rounds a score to two decimal places.
pub fn round_confidence(score: f64) -> f64 {
    (score.clamp(0.0, 1.0) * 100.0).round() / 100.0
}
