// src/matching/similarity.rs
//! Normalized string similarity based on Levenshtein edit distance.
//!
//! Used to compare the project name printed on a certificate with the project
//! names the registry knows about. The edit distance comes from `strsim`,
//! which keeps a single DP row, so memory stays linear in the shorter side
//! even when an upload carries an oversized name.

/// Returns a case-insensitive similarity score in `[0, 1]`.
///
/// `1 - distance / max(|a|, |b|)` over the lower-cased inputs, lengths
/// counted in Unicode scalar values.
///
/// # Special cases
/// - both strings empty: `1.0`
/// - exactly one string empty: `0.0`
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}
