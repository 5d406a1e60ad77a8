// src/storage/listing_store.rs
//! File-backed store for seller-created marketplace listings.
//!
//! Listings live in a single JSON array, newest first. When an IPFS mirror is
//! configured each write is also uploaded and the returned content id is kept
//! in a pointer file next to the listings (`listings-cid.txt`). The local file
//! is the source of truth; the mirror is only read to restore a missing file.

use crate::models::marketplace::MarketplaceListing;
use crate::storage::ipfs_client::IpfsMirror;
use log::{info, warn};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;

const CID_POINTER_FILE: &str = "listings-cid.txt";
const MIRROR_FILE_NAME: &str = "listings.json";

/// Failure to read or write the listing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("listing store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("listing store contains invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IPFS mirror error: {0}")]
    Mirror(String),
}

/// Marketplace listing store.
pub struct ListingStore {
    path: PathBuf,
    cid_path: PathBuf,
    cid_override: Option<String>,
    mirror: Option<IpfsMirror>,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl ListingStore {
    /// Creates a store backed by the JSON file at `path`.
    ///
    /// # Arguments
    /// * `path` - Location of the listings file; parent directories are
    ///   created on first write
    /// * `mirror` - Optional IPFS mirror
    /// * `cid_override` - Content id to restore from instead of the pointer file
    pub fn new(path: PathBuf, mirror: Option<IpfsMirror>, cid_override: Option<String>) -> Self {
        let cid_path = path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(CID_POINTER_FILE);

        ListingStore {
            path,
            cid_path,
            cid_override: cid_override.filter(|cid| !cid.trim().is_empty()),
            mirror,
            write_lock: Mutex::new(()),
        }
    }

    /// Reads every stored listing, newest first.
    ///
    /// The local file wins whenever it exists. Only a missing file is
    /// restored from the IPFS mirror (when a mirror and a content id are
    /// available); a mirror failure then yields an empty list.
    ///
    /// # Returns
    /// - an empty list if nothing is stored or the file does not hold an array
    ///
    /// # Errors
    /// - `StoreError::Io` for I/O failures other than a missing file
    /// - `StoreError::Json` if the file is not valid listing JSON
    pub async fn read_listings(&self) -> Result<Vec<MarketplaceListing>, StoreError> {
        if let Some(listings) = self.read_local().await? {
            return Ok(listings);
        }
        Ok(self.read_mirror().await.unwrap_or_default())
    }

    /// Replaces the stored listings.
    ///
    /// The local file is authoritative: its write must succeed, while mirror
    /// failures are logged and ignored.
    pub async fn write_listings(&self, listings: &[MarketplaceListing]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(listings)?).await?;

        if let Some(mirror) = &self.mirror {
            match mirror.store_json(&listings, MIRROR_FILE_NAME).await {
                Ok(cid) => {
                    info!("mirrored {} listings to IPFS as {}", listings.len(), cid);
                    if let Err(e) = fs::write(&self.cid_path, &cid).await {
                        warn!("could not save IPFS content id pointer: {}", e);
                    }
                }
                Err(e) => warn!("IPFS mirror upload failed: {}", e),
            }
        }
        Ok(())
    }

    /// Inserts a listing at the front of the store.
    pub async fn prepend(&self, listing: MarketplaceListing) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut listings = self.read_listings().await?;
        listings.insert(0, listing);
        self.write_listings(&listings).await
    }

    /// `None` when the listings file does not exist.
    async fn read_local(&self) -> Result<Option<Vec<MarketplaceListing>>, StoreError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Value>(&raw)? {
            value @ Value::Array(_) => Ok(Some(serde_json::from_value(value)?)),
            _ => Ok(Some(Vec::new())),
        }
    }

    async fn read_mirror(&self) -> Option<Vec<MarketplaceListing>> {
        let mirror = self.mirror.as_ref()?;
        let cid = self.listings_cid().await?;

        match mirror.retrieve_json::<Vec<MarketplaceListing>>(&cid).await {
            Ok(listings) => {
                info!("restored {} listings from IPFS {}", listings.len(), cid);
                Some(listings)
            }
            Err(e) => {
                warn!("IPFS read of {} failed: {}", cid, e);
                None
            }
        }
    }

    async fn listings_cid(&self) -> Option<String> {
        if let Some(cid) = &self.cid_override {
            return Some(cid.clone());
        }
        let cid = fs::read_to_string(&self.cid_path).await.ok()?;
        let cid = cid.trim();
        (!cid.is_empty()).then(|| cid.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::marketplace::Seller;
    use mockito::Matcher;
    use tempfile::tempdir;

    fn listing(id: &str) -> MarketplaceListing {
        MarketplaceListing {
            id: id.to_string(),
            title: format!("Project {id}"),
            description: "Listed by Test. 10 credits available.".into(),
            image: "https://example.org/img.jpg".into(),
            price_per_tonne: 12.0,
            country: "Kenya".into(),
            category: "Reforestation".into(),
            vintage: 2021,
            verified: true,
            registry: "Verra".into(),
            credits: 10.0,
            seller: Seller {
                id: None,
                name: "Test".into(),
                email: None,
            },
            certificate: None,
            authentication: None,
            created_at: "2026-10-18T00:00:00.000Z".into(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let store = ListingStore::new(dir.path().join("listings.json"), None, None);
        assert!(store.read_listings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prepend_keeps_newest_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("listings.json");
        let store = ListingStore::new(path.clone(), None, None);

        store.prepend(listing("older")).await.unwrap();
        store.prepend(listing("newer")).await.unwrap();

        let ids: Vec<String> = store.read_listings().await.unwrap().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["newer", "older"]);

        // A fresh store over the same file sees the same data.
        let reopened = ListingStore::new(path, None, None);
        assert_eq!(reopened.read_listings().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_non_array_document_reads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("listings.json");
        std::fs::write(&path, r#"{"listings": []}"#).unwrap();

        let store = ListingStore::new(path, None, None);
        assert!(store.read_listings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("listings.json");
        std::fs::write(&path, "[{ not json").unwrap();

        let store = ListingStore::new(path, None, None);
        assert!(matches!(store.read_listings().await, Err(StoreError::Json(_))));
    }

    #[tokio::test]
    async fn test_unreachable_mirror_does_not_block_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("listings.json");
        let mirror = IpfsMirror::new("http://127.0.0.1:9").unwrap();
        let store = ListingStore::new(path, Some(mirror), Some("bafy-missing".into()));

        store.prepend(listing("local")).await.unwrap();

        let listings = store.read_listings().await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, "local");
    }

    #[tokio::test]
    async fn test_concurrent_prepends_are_not_lost() {
        let dir = tempdir().unwrap();
        let store = std::sync::Arc::new(ListingStore::new(dir.path().join("listings.json"), None, None));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.prepend(listing(&format!("L-{i}"))).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.read_listings().await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_mirror_restores_missing_file_once() {
        let mut node = mockito::Server::new_async().await;
        let seed = serde_json::to_string(&vec![listing("seed")]).unwrap();
        let cat = node
            .mock("POST", "/api/v0/cat")
            .match_query(Matcher::UrlEncoded("arg".into(), "bafy-pinned".into()))
            .with_status(200)
            .with_body(seed)
            .expect(1)
            .create_async()
            .await;
        let add = node
            .mock("POST", "/api/v0/add")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"Name":"listings.json","Hash":"bafy-latest","Size":"1"}"#)
            .expect(2)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let mirror = IpfsMirror::new(&node.url()).unwrap();
        let store = ListingStore::new(dir.path().join("listings.json"), Some(mirror), Some("bafy-pinned".into()));

        store.prepend(listing("first")).await.unwrap();
        store.prepend(listing("second")).await.unwrap();

        // The pinned content id is only used to restore; later writes build on the local file.
        let ids: Vec<String> = store.read_listings().await.unwrap().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["second", "first", "seed"]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join(CID_POINTER_FILE)).unwrap(),
            "bafy-latest"
        );
        cat.assert_async().await;
        add.assert_async().await;
    }

    #[tokio::test]
    async fn test_local_file_wins_over_mirror() {
        let mut node = mockito::Server::new_async().await;
        let cat = node
            .mock("POST", "/api/v0/cat")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .expect(0)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let path = dir.path().join("listings.json");
        std::fs::write(&path, serde_json::to_string(&vec![listing("local")]).unwrap()).unwrap();

        let mirror = IpfsMirror::new(&node.url()).unwrap();
        let store = ListingStore::new(path, Some(mirror), Some("bafy-stale".into()));

        assert_eq!(store.read_listings().await.unwrap()[0].id, "local");
        cat.assert_async().await;
    }
}
