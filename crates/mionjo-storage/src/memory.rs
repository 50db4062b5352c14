//! In-memory object store for deterministic testing.
//!
//! Mirrors the real backend's contract (no implicit overwrite, not-found on
//! removing missing objects, bounded listing pages) and adds failure
//! injection plus a call log so lifecycle tests can assert which storage
//! operations ran.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mionjo_core::{Error, ObjectStore, Result};

/// Configurable in-memory `ObjectStore`.
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    inner: Arc<Mutex<Inner>>,
    fail_put: bool,
    fail_list: bool,
    fail_remove: bool,
}

#[derive(Default)]
struct Inner {
    // BTreeMap keeps listings in a stable order
    objects: BTreeMap<String, Vec<u8>>,
    call_log: Vec<String>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `put` fail with a storage error.
    pub fn with_failing_put(mut self) -> Self {
        self.fail_put = true;
        self
    }

    /// Make every `list` fail with a storage error.
    pub fn with_failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    /// Make every `remove` fail with a storage error.
    pub fn with_failing_remove(mut self) -> Self {
        self.fail_remove = true;
        self
    }

    /// Seed an object directly, bypassing the no-overwrite rule.
    pub fn seed(&self, key: impl Into<String>, bytes: Vec<u8>) {
        let mut inner = self.inner.lock().unwrap();
        inner.objects.insert(key.into(), bytes);
    }

    /// Whether an object currently exists.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().unwrap().objects.contains_key(key)
    }

    /// Number of stored objects.
    pub fn object_count(&self) -> usize {
        self.inner.lock().unwrap().objects.len()
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().unwrap().objects.keys().cloned().collect()
    }

    /// Operations invoked so far, e.g. `put:rapport_1_2.pdf`.
    pub fn call_log(&self) -> Vec<String> {
        self.inner.lock().unwrap().call_log.clone()
    }

    fn log(&self, entry: String) {
        self.inner.lock().unwrap().call_log.push(entry);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.log(format!("put:{}", key));
        if self.fail_put {
            return Err(Error::Storage("injected put failure".into()));
        }
        let mut inner = self.inner.lock().unwrap();
        if inner.objects.contains_key(key) {
            return Err(Error::Storage(format!("duplicate key: {}", key)));
        }
        inner.objects.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn list(&self, prefix: &str, limit: usize, offset: usize) -> Result<Vec<String>> {
        self.log(format!("list:{}:{}:{}", prefix, limit, offset));
        if self.fail_list {
            return Err(Error::Storage("injected list failure".into()));
        }
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .objects
            .keys()
            .filter(|k| k.starts_with(prefix))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn remove(&self, keys: &[String]) -> Result<Vec<String>> {
        self.log(format!("remove:{}", keys.join(",")));
        if self.fail_remove {
            return Err(Error::Storage("injected remove failure".into()));
        }
        let mut inner = self.inner.lock().unwrap();
        let mut removed = Vec::new();
        for key in keys {
            if inner.objects.remove(key).is_some() {
                removed.push(key.clone());
            }
        }
        if removed.is_empty() && !keys.is_empty() {
            return Err(Error::ObjectNotFound(keys.join(",")));
        }
        Ok(removed)
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "https://storage.test/storage/v1/object/public/mionjo_files/{}",
            urlencoding::encode(key)
        )
    }
}
