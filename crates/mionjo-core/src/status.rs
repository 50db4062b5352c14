//! Status derivation: stored status + deadline + current time → effective
//! status and overdue day count.
//!
//! The record backend persists status as French text ("En cours",
//! "Termine"). Comparing those literals inline is typo- and case-prone, so
//! they are parsed once into a closed enum through an explicit mapping
//! table; unknown backend-defined values are preserved verbatim as
//! `Other`.
//!
//! Effective status is display state: it is recomputed on every query from
//! the three inputs and never written back to the record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::defaults::MILLIS_PER_DAY;
use crate::models::ActivityRecord;

/// Status as persisted by the record backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredStatus {
    /// "En cours" — activity underway.
    InProgress,
    /// "Termine" / "Terminé" — activity delivered.
    Completed,
    /// Any other backend-defined value, preserved verbatim.
    Other(String),
}

impl StoredStatus {
    /// Parse the backend's status text.
    ///
    /// Case-insensitive; tolerates the accented and unaccented spellings of
    /// "terminé" that both occur in historical data.
    pub fn from_backend(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "en cours" => StoredStatus::InProgress,
            "termine" | "terminé" => StoredStatus::Completed,
            _ => StoredStatus::Other(raw.trim().to_string()),
        }
    }

    /// Canonical backend text for this status.
    pub fn as_backend_label(&self) -> &str {
        match self {
            StoredStatus::InProgress => "En cours",
            StoredStatus::Completed => "Termine",
            StoredStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for StoredStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_backend_label())
    }
}

impl Serialize for StoredStatus {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(self.as_backend_label())
    }
}

impl<'de> Deserialize<'de> for StoredStatus {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(de)?;
        if raw.trim().is_empty() {
            return Err(de::Error::custom("status cannot be empty"));
        }
        Ok(StoredStatus::from_backend(&raw))
    }
}

/// Display status derived from stored status and current time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectiveStatus {
    InProgress,
    Completed,
    /// In progress with a deadline in the past.
    Overdue,
    /// Mirror of an unrecognized stored status.
    Other(String),
}

impl fmt::Display for EffectiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EffectiveStatus::InProgress => "en cours",
            EffectiveStatus::Completed => "termine",
            EffectiveStatus::Overdue => "en_retard",
            EffectiveStatus::Other(raw) => raw,
        };
        f.write_str(s)
    }
}

/// Result of status derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub effective: EffectiveStatus,
    /// Whole days past the deadline, rounded up on any partial day.
    /// Zero unless `effective` is `Overdue`.
    pub overdue_days: i64,
}

/// Derive the effective status for display.
///
/// Only an in-progress activity can become overdue: a completed one is
/// never reclassified regardless of its deadline, and unknown statuses are
/// mirrored untouched. Deterministic in its three inputs.
pub fn derive_status(
    stored: &StoredStatus,
    deadline: DateTime<Utc>,
    now: DateTime<Utc>,
) -> StatusReport {
    match stored {
        StoredStatus::InProgress if deadline < now => {
            let late_ms = (now - deadline).num_milliseconds();
            // ceil on partial days: one millisecond late is one day late
            let overdue_days = (late_ms + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY;
            StatusReport {
                effective: EffectiveStatus::Overdue,
                overdue_days,
            }
        }
        StoredStatus::InProgress => StatusReport {
            effective: EffectiveStatus::InProgress,
            overdue_days: 0,
        },
        StoredStatus::Completed => StatusReport {
            effective: EffectiveStatus::Completed,
            overdue_days: 0,
        },
        StoredStatus::Other(raw) => StatusReport {
            effective: EffectiveStatus::Other(raw.clone()),
            overdue_days: 0,
        },
    }
}

/// Per-bucket record counts for the dashboard tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub overdue: usize,
}

impl StatusCounts {
    /// Tally effective statuses across a record set at a single instant.
    pub fn tally(records: &[ActivityRecord], now: DateTime<Utc>) -> Self {
        let mut counts = StatusCounts::default();
        for rec in records {
            counts.total += 1;
            match derive_status(&rec.status, rec.deadline, now).effective {
                EffectiveStatus::InProgress => counts.in_progress += 1,
                EffectiveStatus::Completed => counts.completed += 1,
                EffectiveStatus::Overdue => counts.overdue += 1,
                EffectiveStatus::Other(_) => {}
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_stored_status_mapping_table() {
        assert_eq!(StoredStatus::from_backend("En cours"), StoredStatus::InProgress);
        assert_eq!(StoredStatus::from_backend("EN COURS"), StoredStatus::InProgress);
        assert_eq!(StoredStatus::from_backend("Termine"), StoredStatus::Completed);
        assert_eq!(StoredStatus::from_backend("Terminé"), StoredStatus::Completed);
        assert_eq!(StoredStatus::from_backend("terminé "), StoredStatus::Completed);
        assert_eq!(
            StoredStatus::from_backend("Suspendu"),
            StoredStatus::Other("Suspendu".to_string())
        );
    }

    #[test]
    fn test_stored_status_label_roundtrip() {
        assert_eq!(StoredStatus::InProgress.as_backend_label(), "En cours");
        assert_eq!(StoredStatus::Completed.as_backend_label(), "Termine");
        assert_eq!(
            StoredStatus::Other("Suspendu".into()).as_backend_label(),
            "Suspendu"
        );
    }

    #[test]
    fn test_in_progress_before_deadline_stays_in_progress() {
        let deadline = at(2026, 6, 1, 12);
        let now = at(2026, 6, 1, 11);
        let report = derive_status(&StoredStatus::InProgress, deadline, now);
        assert_eq!(report.effective, EffectiveStatus::InProgress);
        assert_eq!(report.overdue_days, 0);
    }

    #[test]
    fn test_deadline_exactly_now_is_not_overdue() {
        let t = at(2026, 6, 1, 12);
        let report = derive_status(&StoredStatus::InProgress, t, t);
        assert_eq!(report.effective, EffectiveStatus::InProgress);
    }

    #[test]
    fn test_one_millisecond_late_is_one_day_overdue() {
        let deadline = at(2026, 6, 1, 12);
        let now = deadline + Duration::milliseconds(1);
        let report = derive_status(&StoredStatus::InProgress, deadline, now);
        assert_eq!(report.effective, EffectiveStatus::Overdue);
        assert_eq!(report.overdue_days, 1);
    }

    #[test]
    fn test_partial_day_rounds_up() {
        let deadline = at(2026, 6, 1, 12);
        // 2 days and 1 hour late -> 3
        let now = deadline + Duration::days(2) + Duration::hours(1);
        let report = derive_status(&StoredStatus::InProgress, deadline, now);
        assert_eq!(report.overdue_days, 3);
    }

    #[test]
    fn test_exact_day_multiple_does_not_round_up() {
        let deadline = at(2026, 6, 1, 12);
        let now = deadline + Duration::days(5);
        let report = derive_status(&StoredStatus::InProgress, deadline, now);
        assert_eq!(report.overdue_days, 5);
    }

    #[test]
    fn test_completed_never_reclassified() {
        let deadline = at(2020, 1, 1, 0);
        let now = at(2026, 1, 1, 0);
        let report = derive_status(&StoredStatus::Completed, deadline, now);
        assert_eq!(report.effective, EffectiveStatus::Completed);
        assert_eq!(report.overdue_days, 0);
    }

    #[test]
    fn test_other_status_mirrored() {
        let deadline = at(2020, 1, 1, 0);
        let now = at(2026, 1, 1, 0);
        let report = derive_status(&StoredStatus::Other("Suspendu".into()), deadline, now);
        assert_eq!(report.effective, EffectiveStatus::Other("Suspendu".into()));
        assert_eq!(report.overdue_days, 0);
    }

    #[test]
    fn test_overdue_iff_deadline_before_now() {
        let base = at(2026, 3, 1, 0);
        for hours in [-48i64, -1, 0, 1, 48] {
            let now = base + Duration::hours(hours);
            let report = derive_status(&StoredStatus::InProgress, base, now);
            let overdue = report.effective == EffectiveStatus::Overdue;
            assert_eq!(overdue, base < now, "hours offset {}", hours);
        }
    }

    #[test]
    fn test_status_counts_tally() {
        let now = at(2026, 6, 1, 0);
        let mk = |id: i64, status: StoredStatus, deadline: DateTime<Utc>| ActivityRecord {
            id,
            responsible_name: "x".into(),
            responsible_email: "x@example.org".into(),
            description: "d".into(),
            observation: None,
            status,
            deadline,
            delivered_at: None,
            attachment_ref: None,
            attachment_file_name: None,
        };
        let records = vec![
            mk(1, StoredStatus::InProgress, at(2026, 7, 1, 0)),
            mk(2, StoredStatus::InProgress, at(2026, 5, 1, 0)),
            mk(3, StoredStatus::Completed, at(2026, 5, 1, 0)),
            mk(4, StoredStatus::Other("Suspendu".into()), at(2026, 5, 1, 0)),
        ];
        let counts = StatusCounts::tally(&records, now);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.in_progress, 1);
        assert_eq!(counts.overdue, 1);
        assert_eq!(counts.completed, 1);
    }
}
