// src/storage/mod.rs
//! Persistence for marketplace listings.

pub mod ipfs_client;
pub mod listing_store;
