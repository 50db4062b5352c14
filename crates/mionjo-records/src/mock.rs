//! In-memory record store for deterministic testing.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use mionjo_core::{ActivityRecord, Error, RecordStore, Result};

/// Configurable in-memory `RecordStore`.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    inner: Arc<Mutex<Inner>>,
    fail_update: bool,
    fail_delete: bool,
}

#[derive(Default)]
struct Inner {
    records: BTreeMap<i64, ActivityRecord>,
    call_log: Vec<String>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `update_attachment` fail with a persist error.
    pub fn with_failing_update(mut self) -> Self {
        self.fail_update = true;
        self
    }

    /// Make every `delete_record` fail with a persist error.
    pub fn with_failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    /// Seed a record.
    pub fn seed(&self, record: ActivityRecord) {
        let mut inner = self.inner.lock().unwrap();
        inner.records.insert(record.id, record);
    }

    /// Fetch one record by id, if present.
    pub fn get(&self, record_id: i64) -> Option<ActivityRecord> {
        self.inner.lock().unwrap().records.get(&record_id).cloned()
    }

    /// Whether a record exists.
    pub fn contains(&self, record_id: i64) -> bool {
        self.inner.lock().unwrap().records.contains_key(&record_id)
    }

    /// Operations invoked so far, e.g. `update_attachment:42`.
    pub fn call_log(&self) -> Vec<String> {
        self.inner.lock().unwrap().call_log.clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn update_attachment(&self, record_id: i64, url: &str, file_name: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.call_log.push(format!("update_attachment:{}", record_id));
        if self.fail_update {
            return Err(Error::Persist("injected update failure".into()));
        }
        let record = inner
            .records
            .get_mut(&record_id)
            .ok_or(Error::RecordNotFound(record_id))?;
        record.attachment_ref = Some(url.to_string());
        record.attachment_file_name = Some(file_name.to_string());
        record.delivered_at = Some(Utc::now());
        Ok(())
    }

    async fn delete_record(&self, record_id: i64) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.call_log.push(format!("delete_record:{}", record_id));
        if self.fail_delete {
            return Err(Error::Persist("injected delete failure".into()));
        }
        if inner.records.remove(&record_id).is_none() {
            return Err(Error::RecordNotFound(record_id));
        }
        Ok(())
    }

    async fn fetch_records(&self) -> Result<Vec<ActivityRecord>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.records.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mionjo_core::StoredStatus;

    fn record(id: i64) -> ActivityRecord {
        ActivityRecord {
            id,
            responsible_name: "x".into(),
            responsible_email: "x@example.org".into(),
            description: "d".into(),
            observation: None,
            status: StoredStatus::InProgress,
            deadline: Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap(),
            delivered_at: None,
            attachment_ref: None,
            attachment_file_name: None,
        }
    }

    #[tokio::test]
    async fn test_update_attachment_sets_fields_together() {
        let store = MemoryRecordStore::new();
        store.seed(record(1));
        store
            .update_attachment(1, "https://x/rapport_1_5.pdf", "rapport.pdf")
            .await
            .unwrap();
        let rec = store.get(1).unwrap();
        assert_eq!(rec.attachment_ref.as_deref(), Some("https://x/rapport_1_5.pdf"));
        assert_eq!(rec.attachment_file_name.as_deref(), Some("rapport.pdf"));
        assert!(rec.delivered_at.is_some());
    }

    #[tokio::test]
    async fn test_delete_unknown_record_is_not_found() {
        let store = MemoryRecordStore::new();
        let err = store.delete_record(9).await.unwrap_err();
        assert!(matches!(err, Error::RecordNotFound(9)));
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let store = MemoryRecordStore::new();
        store.seed(record(2));
        store.delete_record(2).await.unwrap();
        assert!(!store.contains(2));
    }
}
