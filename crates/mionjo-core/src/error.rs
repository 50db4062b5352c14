//! Error types for the mionjo activity tracker.

use thiserror::Error;

/// Result type alias using mionjo's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for mionjo operations.
///
/// The taxonomy separates validation failures (no side effect attempted),
/// storage failures (the object backend), and persistence failures (the
/// record backend, which holds the authoritative state and is never
/// silently swallowed). Not-found conditions get their own variants so
/// callers can normalize them to success wherever deletion is involved.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid input (malformed reference, empty payload, bad argument)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Uploaded payload exceeds the attachment size ceiling
    #[error("Attachment too large: {size_bytes} bytes (limit {limit_bytes})")]
    AttachmentTooLarge { size_bytes: u64, limit_bytes: u64 },

    /// Object storage operation failed (transport, permission, backend)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Object not present in storage
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Record backend operation failed
    #[error("Persist error: {0}")]
    Persist(String),

    /// Activity record not found
    #[error("Record not found: {0}")]
    RecordNotFound(i64),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for the not-found variants that delete flows absorb as
    /// "already satisfied".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ObjectNotFound(_) | Error::RecordNotFound(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("empty filename".to_string());
        assert_eq!(err.to_string(), "Invalid input: empty filename");
    }

    #[test]
    fn test_error_display_attachment_too_large() {
        let err = Error::AttachmentTooLarge {
            size_bytes: 200,
            limit_bytes: 100,
        };
        assert_eq!(
            err.to_string(),
            "Attachment too large: 200 bytes (limit 100)"
        );
    }

    #[test]
    fn test_error_display_storage() {
        let err = Error::Storage("bucket unreachable".to_string());
        assert_eq!(err.to_string(), "Storage error: bucket unreachable");
    }

    #[test]
    fn test_error_display_object_not_found() {
        let err = Error::ObjectNotFound("rapport_1_2.pdf".to_string());
        assert_eq!(err.to_string(), "Object not found: rapport_1_2.pdf");
    }

    #[test]
    fn test_error_display_persist() {
        let err = Error::Persist("backend 500".to_string());
        assert_eq!(err.to_string(), "Persist error: backend 500");
    }

    #[test]
    fn test_error_display_record_not_found() {
        let err = Error::RecordNotFound(42);
        assert_eq!(err.to_string(), "Record not found: 42");
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::ObjectNotFound("k".into()).is_not_found());
        assert!(Error::RecordNotFound(7).is_not_found());
        assert!(!Error::Storage("down".into()).is_not_found());
        assert!(!Error::Persist("down".into()).is_not_found());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
