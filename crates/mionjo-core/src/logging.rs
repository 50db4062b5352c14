//! Structured logging field name constants for the mionjo tracker.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Authoritative state could not be updated, operator attention |
//! | WARN  | Recoverable issue, best-effort step failed and was absorbed |
//! | INFO  | Lifecycle operation completions |
//! | DEBUG | Decision points, resolved keys, reconciliation outcomes |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID for one compound lifecycle operation.
/// Format: UUIDv7 (time-ordered).
pub const OPERATION_ID: &str = "op_id";

/// Subsystem originating the log event.
/// Values: "storage", "records", "attachments", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name.
/// Examples: "replace_attachment", "delete_activity", "reconcile"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Activity record ID being operated on.
pub const RECORD_ID: &str = "record_id";

/// Storage object key.
pub const OBJECT_KEY: &str = "object_key";

/// Bucket name.
pub const BUCKET: &str = "bucket";

/// Stored attachment reference (URL or bare key).
pub const ATTACHMENT_REF: &str = "attachment_ref";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Payload size in bytes.
pub const SIZE_BYTES: &str = "size_bytes";

/// Number of object names scanned during reconciliation.
pub const SCANNED_COUNT: &str = "scanned_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
