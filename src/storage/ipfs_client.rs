// src/storage/ipfs_client.rs
//! IPFS mirror for the marketplace listing set.
//!
//! Every write of the listing file is also pushed to an IPFS node so the
//! marketplace can be restored from its content id when the local file is
//! gone (see [`crate::storage::listing_store`]).
//!
//! Talks to the node's HTTP RPC API (`/api/v0/add`, `/api/v0/cat`), which
//! only accepts `POST`.

use crate::storage::listing_store::StoreError;
use crate::utils::serialization::{deserialize, serialize};
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Answer of `/api/v0/add`.
#[derive(Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

/// Handle to an IPFS node's RPC API.
#[derive(Clone)]
pub struct IpfsMirror {
    http: reqwest::Client,
    api_url: String,
}

impl IpfsMirror {
    /// Connects to the IPFS HTTP API at `url` (e.g. `http://localhost:5001`).
    ///
    /// # Errors
    /// Returns `StoreError::Mirror` if the URL is not absolute or the HTTP
    /// client cannot be built. No request is made until the first read or
    /// write.
    pub fn new(url: &str) -> Result<Self, StoreError> {
        Url::parse(url).map_err(|e| StoreError::Mirror(format!("invalid IPFS url {url}: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(mirror_error)?;

        Ok(IpfsMirror {
            http,
            api_url: url.trim_end_matches('/').to_string(),
        })
    }

    /// Adds raw bytes to IPFS and returns their content id.
    pub async fn store_data(&self, data: Vec<u8>, file_name: &str) -> Result<String, StoreError> {
        let form = Form::new().part("file", Part::bytes(data).file_name(file_name.to_string()));

        let response = self
            .http
            .post(format!("{}/api/v0/add", self.api_url))
            .multipart(form)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(mirror_error)?;

        let added: AddResponse = response.json().await.map_err(mirror_error)?;
        Ok(added.hash)
    }

    /// Reads the bytes stored under a content id.
    pub async fn retrieve_data(&self, cid: &str) -> Result<Vec<u8>, StoreError> {
        let response = self
            .http
            .post(format!("{}/api/v0/cat", self.api_url))
            .query(&[("arg", cid)])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(mirror_error)?;

        let bytes = response.bytes().await.map_err(mirror_error)?;
        Ok(bytes.to_vec())
    }

    /// Serializes `obj` as JSON and stores it, returning the content id.
    pub async fn store_json<T: Serialize>(&self, obj: &T, file_name: &str) -> Result<String, StoreError> {
        let json = serialize(obj)?;
        self.store_data(json.into_bytes(), file_name).await
    }

    /// Retrieves and deserializes a JSON document.
    pub async fn retrieve_json<T: DeserializeOwned>(&self, cid: &str) -> Result<T, StoreError> {
        let bytes = self.retrieve_data(cid).await?;
        let json = String::from_utf8(bytes)
            .map_err(|e| StoreError::Mirror(format!("mirrored document is not UTF-8: {e}")))?;
        Ok(deserialize(&json)?)
    }
}

fn mirror_error(e: reqwest::Error) -> StoreError {
    StoreError::Mirror(e.to_string())
}
