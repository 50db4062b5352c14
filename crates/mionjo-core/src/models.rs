//! Data model for activity records and attachment operation outcomes.
//!
//! `ActivityRecord` is wire-faithful to the record backend's JSON: field
//! names follow the backend (`id_inf`, `nom_resp`, `lien_fichier`, ...) via
//! serde renames so the Rust side can use conventional naming.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::status::StoredStatus;

/// One tracked activity as persisted by the record backend.
///
/// Invariant: `attachment_ref` and `attachment_file_name` are written and
/// cleared together. `delivered_at` is set iff `attachment_ref` is present,
/// with a tolerated transient divergence between storage upload success and
/// the record update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityRecord {
    /// Stable identifier assigned by the record backend.
    #[serde(rename = "id_inf")]
    pub id: i64,

    /// Responsible party's display name.
    #[serde(rename = "nom_resp")]
    pub responsible_name: String,

    /// Responsible party's email (validated at the edge, free text here).
    #[serde(rename = "mail_resp")]
    pub responsible_email: String,

    /// What the activity is about.
    #[serde(rename = "raison")]
    pub description: String,

    /// Free-text observation, optional.
    #[serde(default)]
    pub observation: Option<String>,

    /// Backend-produced status; parsed via the closed mapping table.
    #[serde(rename = "statut")]
    pub status: StoredStatus,

    /// Deadline, hour granularity (minutes/seconds normalized to zero by
    /// the editing surface; not enforced here).
    #[serde(rename = "datelimite", with = "wire_datetime")]
    pub deadline: DateTime<Utc>,

    /// Set when a report file is uploaded.
    #[serde(
        rename = "date_upload",
        default,
        with = "wire_datetime_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub delivered_at: Option<DateTime<Utc>>,

    /// Opaque reference (public URL or bare storage key) to the currently
    /// attached report; absent means no attachment.
    #[serde(rename = "lien_fichier", default)]
    pub attachment_ref: Option<String>,

    /// Original filename of the attached report, independent of the
    /// storage key.
    #[serde(rename = "fichier_nom", default)]
    pub attachment_file_name: Option<String>,
}

impl ActivityRecord {
    /// Whether the record currently carries an attachment reference.
    pub fn has_attachment(&self) -> bool {
        self.attachment_ref.is_some()
    }
}

/// File payload handed to the replace operation.
#[derive(Debug, Clone)]
pub struct FilePayload {
    /// Original filename as uploaded (used for the record's display name
    /// and the generated key's extension).
    pub name: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl FilePayload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Payload size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Outcome of a successful replace operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpdate {
    /// Storage key the new object was created under.
    pub key: String,
    /// Public retrieval URL persisted to the record.
    pub public_url: String,
    /// Original filename persisted to the record.
    pub file_name: String,
    /// Whether the superseded object was actually removed. `false` covers
    /// both "no previous attachment" and "best-effort removal failed".
    pub old_removed: bool,
}

/// Composite outcome of the delete operation.
///
/// The operation itself returning `Ok` means the record side (the
/// authoritative state) was cleared; `file_removed = false` with
/// `existed = true` is the documented file-leak case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentRemoval {
    /// Whether a stored object was found for the record's reference.
    pub existed: bool,
    /// Whether storage removal actually took effect.
    pub file_removed: bool,
}

/// Datetime codec for the record backend's wire format.
///
/// The backend emits ISO 8601 without a timezone (`2026-01-15T10:00` or
/// with seconds); RFC 3339 is accepted too. Serializes as RFC 3339.
mod wire_datetime {
    use super::*;

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(de)?;
        parse_wire_datetime(&s).map_err(de::Error::custom)
    }
}

/// Optional variant of [`wire_datetime`].
mod wire_datetime_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        dt: &Option<DateTime<Utc>>,
        ser: S,
    ) -> Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => ser.serialize_some(&dt.to_rfc3339()),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let s = Option::<String>::deserialize(de)?;
        match s {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse_wire_datetime(&s).map(Some).map_err(de::Error::custom),
        }
    }
}

fn parse_wire_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    Err(format!(
        "Invalid datetime '{}': expected ISO 8601 (e.g. '2026-01-15T10:00')",
        s
    ))
}
