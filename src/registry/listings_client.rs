// src/registry/listings_client.rs
//! HTTP client for the carbon registry's listings API.
//!
//! Fetches every listing the registry currently offers:
//! - `GET {base_url}/listings` with a bearer token
//! - accepts both a bare JSON array and a `{ "data": [...] }` wrapper
//! - one attempt per call, bounded by the configured timeout
//! - optional snapshot cache (see [`ListingsCache`])

use crate::config::settings::RegistrySettings;
use crate::models::listing::ListingCandidate;
use crate::registry::listings_cache::ListingsCache;
use log::{debug, info, warn};
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Failure to obtain listings from the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Registry request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx answer; carries the response body text
    #[error("Registry API error: {body}")]
    Status { status: u16, body: String },

    #[error("Registry returned malformed JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for the registry listings endpoint.
///
/// Cheap to share: wrap it in an `Arc` and hand it to every service that
/// needs candidates. The underlying `reqwest::Client` pools connections.
pub struct ListingsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    cache: Option<ListingsCache>,
}

impl ListingsClient {
    /// Constructs a client from registry settings.
    ///
    /// # Errors
    /// Returns `RegistryError::Request` if the HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialise).
    pub fn new(settings: &RegistrySettings) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            cache: settings.cache_ttl().map(ListingsCache::new),
        })
    }

    /// Returns the registry's current listings.
    ///
    /// Served from the snapshot cache when one is configured and fresh;
    /// otherwise fetched from the registry.
    ///
    /// # Errors
    /// - `RegistryError::Request` on connection failures, timeouts and
    ///   truncated bodies
    /// - `RegistryError::Status` if the registry answers with a non-2xx status
    /// - `RegistryError::Decode` if the body is not JSON
    pub async fn fetch_listings(&self) -> Result<Arc<Vec<ListingCandidate>>, RegistryError> {
        if let Some(cache) = &self.cache {
            if let Some(listings) = cache.get().await {
                debug!("serving {} listings from cache", listings.len());
                return Ok(listings);
            }
        }

        let listings = Arc::new(self.fetch_remote().await?);
        info!("fetched {} listings from registry", listings.len());

        if let Some(cache) = &self.cache {
            cache.store(Arc::clone(&listings)).await;
        }
        Ok(listings)
    }

    async fn fetch_remote(&self) -> Result<Vec<ListingCandidate>, RegistryError> {
        let url = format!("{}/listings", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("registry answered {} for {}", status, url);
            let body = response.text().await?;
            return Err(RegistryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let payload: Value = serde_json::from_slice(&bytes)?;
        Ok(normalize_listings(payload))
    }
}

/// Normalizes the registry payload to a list of candidates.
///
/// # Accepted shapes
/// - `[ {...}, ... ]`
/// - `{ "data": [ {...}, ... ] }`
///
/// Anything else yields an empty list. Entries that are not listing objects
/// are skipped.
pub fn normalize_listings(payload: Value) -> Vec<ListingCandidate> {
    let entries = match payload {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(entries)) => entries,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                warn!("skipping registry entry #{}: {}", index, e);
                None
            }
        })
        .collect()
}
