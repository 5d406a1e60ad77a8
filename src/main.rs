// src/main.rs

//! # Path2Zero Certificate Authentication - Main Entry Point
//!
//! Initializes the certificate authentication service and starts the API server.
//!
//! ## Architecture Overview
//! 1. **Matching Layer**: field extraction, string similarity and weighted scoring
//! 2. **Registry Layer**: `ListingsClient` for the Carbonmark listings API
//! 3. **Services Layer**: certificate authentication and the HTTP API
//! 4. **Storage Layer**: marketplace listing file with an optional IPFS mirror
//!
//! ## Configuration
//! Settings come from an optional `path2zero.toml` and `PATH2ZERO__*`
//! environment variables. The legacy variables are still honoured:
//! - `CARBONMARK_API_KEY`: registry API key (required)
//! - `CARBONMARK_BASE_URL`: registry base URL
//! - `API_PORT`: port to listen on (default: 3001)
//! - `LISTINGS_CID` / `STORACHA_LISTINGS_CID`: content id of the mirrored listing set

use crate::config::settings::Settings;
use crate::registry::listings_client::ListingsClient;
use crate::services::api_server::{
    ApiServer, AUTHENTICATE_CERTIFICATE_ROUTE, AUTHENTICATE_ROUTE, EXTRACT_ROUTE,
    LIST_CERTIFICATE_ROUTE, MARKETPLACE_LISTINGS_ROUTE, VALIDATE_ROUTE,
};
use crate::services::authenticator::CertificateAuthenticator;
use crate::storage::ipfs_client::IpfsMirror;
use crate::storage::listing_store::ListingStore;
use anyhow::Context;
use dotenv::dotenv;
use log::info;
use std::sync::Arc;

// Module declarations (organized by functional domain)
mod config;        // Layered settings
mod matching;      // Extraction, similarity and scoring
mod models;        // Data structures
mod registry;      // Carbonmark listings client
mod services;      // Business logic and API
mod storage;       // Listing persistence and IPFS mirror
mod utils;         // Helper functions

/// Main application entry point
///
/// # Initialization Sequence
/// 1. Load environment and settings
/// 2. Build the registry client and authenticator
/// 3. Open the listing store (and IPFS mirror, if configured)
/// 4. Start API server
///
/// # Errors
/// Fails if the settings are invalid (e.g. no registry API key) or the
/// server address cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load().context("failed to load settings")?;

    let listings_client = ListingsClient::new(&settings.registry)
        .context("failed to build registry client")?;
    let authenticator = CertificateAuthenticator::new(Arc::new(listings_client));

    let mirror = match settings.storage.ipfs_url.as_deref() {
        Some(url) => Some(IpfsMirror::new(url).context("failed to configure IPFS mirror")?),
        None => None,
    };
    let listing_store = ListingStore::new(
        settings.storage.listings_path.clone(),
        mirror,
        settings.storage.listings_cid.clone(),
    );

    let api_server = ApiServer::new(
        authenticator,
        listing_store,
        settings.server.max_upload_bytes,
    );

    let addr = settings.server.socket_addr().context("invalid server address")?;
    info!("Registry: {}", settings.registry.base_url);
    info!("Listings: {}", settings.storage.listings_path.display());
    info!("Available endpoints:");
    info!("- POST {}", AUTHENTICATE_CERTIFICATE_ROUTE);
    info!("- POST {}", LIST_CERTIFICATE_ROUTE);
    info!("- GET  {}", MARKETPLACE_LISTINGS_ROUTE);
    info!("- POST {}", EXTRACT_ROUTE);
    info!("- POST {}", AUTHENTICATE_ROUTE);
    info!("- POST {}", VALIDATE_ROUTE);

    api_server.run(addr).await.context("API server failed")?;
    Ok(())
}
