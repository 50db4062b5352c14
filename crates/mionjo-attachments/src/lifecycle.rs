//! Attachment lifecycle orchestration: replace and delete as compound,
//! partially-recoverable operations over the storage and record backends.
//!
//! There is no atomicity across the two backends. Each operation is a
//! strictly serialized best-effort sequence ordered so that a mid-sequence
//! failure leaves at worst an orphaned-but-harmless stored object, never a
//! record pointing at a deleted file. No retries are built in: a failed
//! operation is reported as a tagged outcome and is safe to run again
//! whole.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use mionjo_core::defaults::{FALLBACK_EXTENSION, KEY_PREFIX, MAX_ATTACHMENT_BYTES};
use mionjo_core::{
    resolve_object_key, AttachmentRemoval, AttachmentUpdate, Error, FilePayload, ObjectStore,
    RecordStore, Result,
};

use crate::reconcile::reconcile_existing;

/// Orchestrates the attachment lifecycle for activity records.
///
/// Holds no per-record state; operations on different records may run
/// concurrently. Concurrent operations on the *same* record are not
/// coordinated — a replace/delete race can orphan an upload, which the
/// orphan-on-failure handling already covers.
pub struct AttachmentManager {
    store: Arc<dyn ObjectStore>,
    records: Arc<dyn RecordStore>,
}

impl AttachmentManager {
    pub fn new(store: Arc<dyn ObjectStore>, records: Arc<dyn RecordStore>) -> Self {
        Self { store, records }
    }

    /// Upload a new report file for a record, superseding any existing one.
    ///
    /// Sequence: validate size, best-effort removal of the old object,
    /// upload under a fresh collision-proof key, persist the new reference.
    /// Old-object removal failures are logged and discarded — a stale
    /// object leak is preferred over blocking the update. A persist
    /// failure after a successful upload leaves an orphaned object and an
    /// unchanged record; no compensating delete is attempted since a
    /// concurrent retry may still need the object.
    pub async fn replace_attachment(
        &self,
        record_id: i64,
        current_ref: Option<&str>,
        payload: &FilePayload,
    ) -> Result<AttachmentUpdate> {
        let op_id = Uuid::now_v7();

        if payload.size() > MAX_ATTACHMENT_BYTES {
            return Err(Error::AttachmentTooLarge {
                size_bytes: payload.size(),
                limit_bytes: MAX_ATTACHMENT_BYTES,
            });
        }

        let old_removed = match current_ref {
            Some(reference) => self.remove_superseded(op_id, record_id, reference).await,
            None => false,
        };

        let key = generate_key(record_id, &payload.name);
        debug!(op_id = %op_id, record_id, object_key = %key, size_bytes = payload.size(), "uploading report");

        self.store.put(&key, &payload.bytes).await?;
        let public_url = self.store.public_url(&key);

        if let Err(e) = self
            .records
            .update_attachment(record_id, &public_url, &payload.name)
            .await
        {
            // upload succeeded but the reference was never persisted: the
            // object is now an orphan, left for periodic cleanup
            error!(
                op_id = %op_id,
                record_id,
                object_key = %key,
                error = %e,
                "reference not persisted, stored object orphaned"
            );
            return Err(e);
        }

        info!(
            op_id = %op_id,
            record_id,
            object_key = %key,
            old_removed,
            "attachment replaced"
        );
        Ok(AttachmentUpdate {
            key,
            public_url,
            file_name: payload.name.clone(),
            old_removed,
        })
    }

    /// Delete a record together with its attached report, if any.
    ///
    /// Storage first, then the record: the file side is reconciled and
    /// removed best-effort (absent is success, removal failure is an
    /// accepted leak), and only the record deletion itself can fail the
    /// operation. A second delete of the same record reports
    /// `existed: false` and still succeeds.
    pub async fn delete_activity(
        &self,
        record_id: i64,
        current_ref: Option<&str>,
    ) -> Result<AttachmentRemoval> {
        let op_id = Uuid::now_v7();
        let mut outcome = AttachmentRemoval {
            existed: false,
            file_removed: false,
        };

        if let Some(candidate) = current_ref.and_then(resolve_object_key) {
            let reconciled = reconcile_existing(self.store.as_ref(), &candidate).await;
            match reconciled.actual_key {
                Some(actual) => {
                    outcome.existed = true;
                    match self.store.remove(&[actual.clone()]).await {
                        Ok(_) => outcome.file_removed = true,
                        Err(e) if e.is_not_found() => {
                            // gone between listing and removal: same end state
                            outcome.file_removed = true;
                        }
                        Err(e) => {
                            warn!(
                                op_id = %op_id,
                                record_id,
                                object_key = %actual,
                                error = %e,
                                "file removal failed, record deletion proceeds (file leak)"
                            );
                        }
                    }
                }
                None => {
                    debug!(
                        op_id = %op_id,
                        record_id,
                        object_key = %candidate,
                        "referenced object absent, already clean"
                    );
                }
            }
        }

        match self.records.delete_record(record_id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(op_id = %op_id, record_id, "record already deleted");
            }
            Err(e) => {
                error!(op_id = %op_id, record_id, error = %e, "record deletion failed");
                return Err(e);
            }
        }

        info!(
            op_id = %op_id,
            record_id,
            existed = outcome.existed,
            file_removed = outcome.file_removed,
            "activity deleted"
        );
        Ok(outcome)
    }

    /// Best-effort removal of the object a live record currently points
    /// at. The reference was just read from the record and is trusted, so
    /// no reconciliation pass — resolve and remove directly.
    async fn remove_superseded(&self, op_id: Uuid, record_id: i64, reference: &str) -> bool {
        let Some(key) = resolve_object_key(reference) else {
            warn!(
                op_id = %op_id,
                record_id,
                attachment_ref = %reference,
                "unusable old reference, skipping removal"
            );
            return false;
        };

        match self.store.remove(&[key.clone()]).await {
            Ok(_) => {
                debug!(op_id = %op_id, record_id, object_key = %key, "old report removed");
                true
            }
            Err(e) if e.is_not_found() => {
                debug!(op_id = %op_id, record_id, object_key = %key, "old report already absent");
                false
            }
            Err(e) => {
                warn!(
                    op_id = %op_id,
                    record_id,
                    object_key = %key,
                    error = %e,
                    "old report removal failed, continuing with upload"
                );
                false
            }
        }
    }
}

/// Generate a fresh storage key: `rapport_{record_id}_{millis}.{ext}`.
///
/// The timestamp component makes the key collision-proof against the one
/// it supersedes; the record ID keeps it traceable to its owner; the
/// extension carries the original file type (`bin` when the name has
/// none).
fn generate_key(record_id: i64, file_name: &str) -> String {
    let extension = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext,
        _ => FALLBACK_EXTENSION,
    };
    format!(
        "{}{}_{}.{}",
        KEY_PREFIX,
        record_id,
        Utc::now().timestamp_millis(),
        extension
    )
}
