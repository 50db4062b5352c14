//! # mionjo-core
//!
//! Core types, traits, and abstractions for the mionjo activity tracker.
//!
//! This crate provides the record model, the error taxonomy, status
//! derivation, attachment-reference resolution, and the collaborator
//! traits (`ObjectStore`, `RecordStore`) that the other mionjo crates
//! implement or orchestrate over.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod reference;
pub mod status;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::{ActivityRecord, AttachmentRemoval, AttachmentUpdate, FilePayload};
pub use reference::resolve_object_key;
pub use status::{derive_status, EffectiveStatus, StatusCounts, StatusReport, StoredStatus};
pub use traits::{ObjectStore, RecordStore};
