//! Centralized default constants for the mionjo activity tracker.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// STORAGE
// =============================================================================

/// Bucket holding activity report files.
pub const BUCKET: &str = "mionjo_files";

/// Key prefix for generated report objects (`rapport_{id}_{millis}.{ext}`).
pub const KEY_PREFIX: &str = "rapport_";

/// Fixed public-URL path segment for the report bucket. A stored reference
/// containing this segment is a storage URL; the object key follows it.
pub const BUCKET_URL_SEGMENT: &str = "/mionjo_files/";

/// Extension used when an uploaded filename carries none.
pub const FALLBACK_EXTENSION: &str = "bin";

/// Maximum attachment size in bytes (100 MiB).
pub const MAX_ATTACHMENT_BYTES: u64 = 100 * 1024 * 1024;

/// Page size for bucket listings during existence reconciliation.
pub const LIST_PAGE_LIMIT: usize = 1000;

// =============================================================================
// HTTP
// =============================================================================

/// Timeout for object upload requests (seconds). Large files over slow
/// links; generous by design.
pub const UPLOAD_TIMEOUT_SECS: u64 = 300;

/// Timeout for record backend and storage metadata requests (seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// TIME
// =============================================================================

/// Milliseconds per calendar day, for overdue-day arithmetic.
pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
