// src/matching/mod.rs
//! Certificate matching.
//!
//! The pieces that decide whether a certificate corresponds to a real
//! registry listing:
//! 1. **Extraction**: pull labelled fields out of certificate text
//! 2. **Similarity**: normalized Levenshtein similarity for project names
//! 3. **Scoring**: weighted comparison of a certificate against candidates
//! 4. **Validation**: completeness checks for user-entered certificate data
//!
//! Everything here is pure and synchronous; fetching candidates lives in
//! [`crate::registry`].

pub mod extraction;
pub mod scoring;
pub mod similarity;
pub mod validation;
