//! Collaborator contracts consumed by the attachment lifecycle core.
//!
//! Both backends are external services; the core only depends on these
//! narrow traits so tests can swap in in-memory implementations.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ActivityRecord;

/// Object-storage operations over a single bucket.
///
/// Implementations are bucket-scoped at construction; keys are bare object
/// names within that bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create an object under `key`. Must fail if the exact key already
    /// exists (no implicit overwrite).
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// List object names matching `prefix`, bounded by `limit`, starting at
    /// `offset`. An empty listing is a normal result, not an error.
    async fn list(&self, prefix: &str, limit: usize, offset: usize) -> Result<Vec<String>>;

    /// Remove the given objects, returning the names actually removed.
    /// Removing a missing object reports `Error::ObjectNotFound`.
    async fn remove(&self, keys: &[String]) -> Result<Vec<String>>;

    /// Public retrieval URL for an object. Pure string construction; does
    /// not imply the object exists.
    fn public_url(&self, key: &str) -> String;
}

/// Remote CRUD surface of the activity-record backend.
///
/// The backend holds the authoritative state; failures here are never
/// silently swallowed by callers.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new attachment reference and original filename on a
    /// record. The backend sets `date_upload` as a side effect.
    async fn update_attachment(&self, record_id: i64, url: &str, file_name: &str) -> Result<()>;

    /// Delete a record. An unknown id reports `Error::RecordNotFound`.
    async fn delete_record(&self, record_id: i64) -> Result<()>;

    /// Fetch all activity records.
    async fn fetch_records(&self) -> Result<Vec<ActivityRecord>>;
}
