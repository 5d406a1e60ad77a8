// src/registry/mod.rs
//! Access to the external carbon registry.

pub mod listings_cache;
pub mod listings_client;
