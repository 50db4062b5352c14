//! # mionjo-attachments
//!
//! The attachment lifecycle core: existence reconciliation between storage
//! and record state, and the compound replace/delete operations that keep
//! the two consistent.

pub mod lifecycle;
pub mod reconcile;

pub use lifecycle::AttachmentManager;
pub use reconcile::{reconcile_existing, Reconciliation};
