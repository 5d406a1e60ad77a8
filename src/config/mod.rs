// src/config/mod.rs
//! Service configuration.

pub mod settings;
