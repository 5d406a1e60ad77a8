// src/models/mod.rs
//! Data structures shared by the matcher, the registry client and the API.

pub mod authentication;
pub mod certificate;
pub mod listing;
pub mod marketplace;
