//! Existence reconciliation: confirm a derived object key is actually
//! present in storage, correcting for naming drift.
//!
//! Stored references and real object names drift apart over time:
//! extension case differences, double-encoded characters, and two earlier
//! naming conventions all occur in live data. Partial matching accepts a
//! small false-positive risk to cover those drifts; a partial hit is
//! always logged with both names.

use tracing::{debug, warn};

use mionjo_core::defaults::LIST_PAGE_LIMIT;
use mionjo_core::{ObjectStore, Result};

/// Outcome of reconciling a candidate key against the bucket contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Whether a matching object exists.
    pub exists: bool,
    /// The name to operate on when `exists` — the real stored name, which
    /// wins over the derived candidate on a partial match.
    pub actual_key: Option<String>,
}

impl Reconciliation {
    fn not_found() -> Self {
        Self {
            exists: false,
            actual_key: None,
        }
    }

    fn found(actual_key: String) -> Self {
        Self {
            exists: true,
            actual_key: Some(actual_key),
        }
    }
}

/// Reconcile `candidate` against the object names actually in storage.
///
/// Lists the whole bucket in pages so buckets larger than one listing page
/// cannot produce false negatives. Matching, first hit wins:
/// exact equality, then case-insensitive substring containment in either
/// direction (the listed name is taken as the actual key; case-insensitive
/// so `rapport_5_100.pdf` still finds a stored `rapport_5_100.PDF`). A
/// listing failure is absorbed as "not found" — the delete flows this
/// feeds prefer a leaked file over a blocked operation.
pub async fn reconcile_existing(store: &dyn ObjectStore, candidate: &str) -> Reconciliation {
    match scan_bucket(store, candidate).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(
                object_key = %candidate,
                error = %e,
                "reconcile: listing failed, treating as not found"
            );
            Reconciliation::not_found()
        }
    }
}

async fn scan_bucket(store: &dyn ObjectStore, candidate: &str) -> Result<Reconciliation> {
    let candidate_lower = candidate.to_lowercase();
    let mut offset = 0;
    let mut partial: Option<String> = None;
    let mut scanned = 0usize;

    loop {
        let page = store.list("", LIST_PAGE_LIMIT, offset).await?;
        let page_len = page.len();
        scanned += page_len;

        for name in page {
            if name == candidate {
                debug!(object_key = %candidate, scanned_count = scanned, "reconcile: exact match");
                return Ok(Reconciliation::found(name));
            }
            if partial.is_none() {
                let name_lower = name.to_lowercase();
                if name_lower.contains(&candidate_lower) || candidate_lower.contains(&name_lower) {
                    partial = Some(name);
                }
            }
        }

        if page_len < LIST_PAGE_LIMIT {
            break;
        }
        offset += LIST_PAGE_LIMIT;
    }

    if let Some(name) = partial {
        warn!(
            object_key = %candidate,
            actual_key = %name,
            "reconcile: partial match, using stored name"
        );
        return Ok(Reconciliation::found(name));
    }

    debug!(object_key = %candidate, scanned_count = scanned, "reconcile: not found");
    Ok(Reconciliation::not_found())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Minimal store exposing a fixed name list, to drive the matcher
    /// without pulling in the full in-memory backend.
    struct ListOnlyStore {
        names: Vec<String>,
        fail: bool,
        list_calls: Mutex<usize>,
    }

    impl ListOnlyStore {
        fn new(names: &[&str]) -> Self {
            Self {
                names: names.iter().map(|s| s.to_string()).collect(),
                fail: false,
                list_calls: Mutex::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                names: Vec::new(),
                fail: true,
                list_calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl ObjectStore for ListOnlyStore {
        async fn put(&self, _key: &str, _bytes: &[u8]) -> Result<()> {
            unreachable!("reconciliation never writes")
        }

        async fn list(&self, _prefix: &str, limit: usize, offset: usize) -> Result<Vec<String>> {
            *self.list_calls.lock().unwrap() += 1;
            if self.fail {
                return Err(mionjo_core::Error::Storage("injected".into()));
            }
            Ok(self
                .names
                .iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect())
        }

        async fn remove(&self, _keys: &[String]) -> Result<Vec<String>> {
            unreachable!("reconciliation never removes")
        }

        fn public_url(&self, key: &str) -> String {
            format!("https://storage.test/{}", key)
        }
    }

    #[tokio::test]
    async fn test_exact_match_wins() {
        let store = ListOnlyStore::new(&["rapport_5_100.pdf", "rapport_5_100.PDF"]);
        let outcome = reconcile_existing(&store, "rapport_5_100.pdf").await;
        assert!(outcome.exists);
        assert_eq!(outcome.actual_key.as_deref(), Some("rapport_5_100.pdf"));
    }

    #[tokio::test]
    async fn test_partial_match_prefers_stored_name() {
        // extension case drift: candidate .pdf, stored .PDF
        let store = ListOnlyStore::new(&["rapport_5_100.PDF"]);
        let outcome = reconcile_existing(&store, "rapport_5_100.pdf").await;
        assert!(outcome.exists);
        assert_eq!(outcome.actual_key.as_deref(), Some("rapport_5_100.PDF"));
    }

    #[tokio::test]
    async fn test_containment_either_direction() {
        // candidate longer than the listed name
        let store = ListOnlyStore::new(&["rapport_5_100"]);
        let outcome = reconcile_existing(&store, "rapport_5_100.pdf").await;
        assert!(outcome.exists);
        assert_eq!(outcome.actual_key.as_deref(), Some("rapport_5_100"));
    }

    #[tokio::test]
    async fn test_no_match_reports_not_found() {
        let store = ListOnlyStore::new(&["rapport_9_1.xlsx"]);
        let outcome = reconcile_existing(&store, "rapport_5_100.pdf").await;
        assert!(!outcome.exists);
        assert!(outcome.actual_key.is_none());
    }

    #[tokio::test]
    async fn test_empty_bucket_is_not_found_not_error() {
        let store = ListOnlyStore::new(&[]);
        let outcome = reconcile_existing(&store, "rapport_5_100.pdf").await;
        assert!(!outcome.exists);
    }

    #[tokio::test]
    async fn test_listing_failure_absorbed_as_not_found() {
        let store = ListOnlyStore::failing();
        let outcome = reconcile_existing(&store, "rapport_5_100.pdf").await;
        assert!(!outcome.exists);
    }

    #[tokio::test]
    async fn test_scans_past_first_page() {
        // match sits beyond one full page, so a single-page scan would miss it
        let mut names: Vec<String> = (0..LIST_PAGE_LIMIT)
            .map(|i| format!("autre_{}.txt", i))
            .collect();
        names.push("rapport_5_100.PDF".to_string());
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let store = ListOnlyStore::new(&refs);

        let outcome = reconcile_existing(&store, "rapport_5_100.pdf").await;
        assert!(outcome.exists);
        assert_eq!(outcome.actual_key.as_deref(), Some("rapport_5_100.PDF"));
        assert!(*store.list_calls.lock().unwrap() >= 2);
    }
}
