// src/registry/listings_cache.rs
//! Short-lived snapshot of the registry's listings.
//!
//! The registry changes slowly while every authentication needs the full
//! listing set, so one snapshot can serve all requests within the TTL.

use crate::models::listing::ListingCandidate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

struct Snapshot {
    fetched_at: Instant,
    listings: Arc<Vec<ListingCandidate>>,
}

/// Time-bounded cache holding a single listings snapshot.
pub struct ListingsCache {
    ttl: Duration,
    snapshot: RwLock<Option<Snapshot>>,
}

impl ListingsCache {
    pub fn new(ttl: Duration) -> Self {
        ListingsCache {
            ttl,
            snapshot: RwLock::new(None),
        }
    }

    /// Returns the snapshot if it is younger than the TTL.
    pub async fn get(&self) -> Option<Arc<Vec<ListingCandidate>>> {
        let guard = self.snapshot.read().await;
        guard
            .as_ref()
            .filter(|snapshot| snapshot.fetched_at.elapsed() < self.ttl)
            .map(|snapshot| Arc::clone(&snapshot.listings))
    }

    /// Replaces the snapshot.
    pub async fn store(&self, listings: Arc<Vec<ListingCandidate>>) {
        let mut guard = self.snapshot.write().await;
        *guard = Some(Snapshot {
            fetched_at: Instant::now(),
            listings,
        });
    }
}
