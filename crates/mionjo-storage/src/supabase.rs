//! Supabase Storage backend implementation.
//!
//! Talks to the Supabase Storage REST API for one fixed bucket: object
//! create (no implicit overwrite), listing, bulk remove, and public URL
//! construction. Auth is the project service key sent as a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mionjo_core::{defaults, Error, ObjectStore, Result};

/// Default request timeout (seconds), non-upload calls.
pub const REQUEST_TIMEOUT_SECS: u64 = defaults::REQUEST_TIMEOUT_SECS;

/// Default upload timeout (seconds).
pub const UPLOAD_TIMEOUT_SECS: u64 = defaults::UPLOAD_TIMEOUT_SECS;

/// Supabase Storage client scoped to a single bucket.
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    bucket: String,
    api_key: String,
    upload_timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: usize,
    offset: usize,
}

#[derive(Debug, Deserialize)]
struct ObjectEntry {
    name: String,
}

#[derive(Debug, Serialize)]
struct RemoveRequest<'a> {
    prefixes: &'a [String],
}

impl SupabaseStorage {
    /// Create a client for `bucket` on the given Supabase project URL.
    pub fn new(base_url: String, api_key: String, bucket: String) -> Self {
        let upload_timeout = std::env::var("MIONJO_UPLOAD_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(UPLOAD_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        info!(
            bucket = %bucket,
            base_url = %base_url,
            "Initializing Supabase storage backend"
        );

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket,
            api_key,
            upload_timeout_secs: upload_timeout,
        }
    }

    /// Create from environment variables.
    ///
    /// Requires `MIONJO_SUPABASE_URL` and `MIONJO_SUPABASE_KEY`;
    /// `MIONJO_BUCKET` falls back to the default report bucket.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("MIONJO_SUPABASE_URL")
            .map_err(|_| Error::Config("MIONJO_SUPABASE_URL is not set".into()))?;
        let api_key = std::env::var("MIONJO_SUPABASE_KEY")
            .map_err(|_| Error::Config("MIONJO_SUPABASE_KEY is not set".into()))?;
        let bucket =
            std::env::var("MIONJO_BUCKET").unwrap_or_else(|_| defaults::BUCKET.to_string());
        Ok(Self::new(base_url, api_key, bucket))
    }

    /// Bucket this client operates on.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            urlencoding::encode(key)
        )
    }

    async fn error_from_response(response: reqwest::Response, key: &str) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            Error::ObjectNotFound(key.to_string())
        } else {
            Error::Storage(format!("{}: {}", status, body))
        }
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        debug!(object_key = %key, size_bytes = bytes.len(), "storage: put");

        let response = self
            .client
            .post(self.object_url(key))
            .timeout(Duration::from_secs(self.upload_timeout_secs))
            .bearer_auth(&self.api_key)
            .header("x-upsert", "false")
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| Error::Storage(format!("upload failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!("upload {}: {}", status, body)));
        }
        Ok(())
    }

    async fn list(&self, prefix: &str, limit: usize, offset: usize) -> Result<Vec<String>> {
        let url = format!("{}/storage/v1/object/list/{}", self.base_url, self.bucket);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&ListRequest {
                prefix,
                limit,
                offset,
            })
            .send()
            .await
            .map_err(|e| Error::Storage(format!("list failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response, prefix).await);
        }

        let entries: Vec<ObjectEntry> = response.json().await?;
        Ok(entries.into_iter().map(|e| e.name).collect())
    }

    async fn remove(&self, keys: &[String]) -> Result<Vec<String>> {
        debug!(keys = ?keys, "storage: remove");

        let url = format!("{}/storage/v1/object/{}", self.base_url, self.bucket);
        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.api_key)
            .json(&RemoveRequest { prefixes: keys })
            .send()
            .await
            .map_err(|e| Error::Storage(format!("remove failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response, &keys.join(",")).await);
        }

        let removed: Vec<ObjectEntry> = response.json().await?;
        if removed.is_empty() && !keys.is_empty() {
            // backend reports success but removed nothing: the objects
            // were already gone
            return Err(Error::ObjectNotFound(keys.join(",")));
        }
        Ok(removed.into_iter().map(|e| e.name).collect())
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            self.bucket,
            urlencoding::encode(key)
        )
    }
}
