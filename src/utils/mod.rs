// src/utils/mod.rs
//! Helper functions.

pub mod pdf;
pub mod serialization;
