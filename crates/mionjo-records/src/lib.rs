//! # mionjo-records
//!
//! Clients for the activity-record backend: the production HTTP client and
//! an in-memory store for tests. Both implement `mionjo_core::RecordStore`.

pub mod client;
pub mod mock;

pub use client::HttpRecordStore;
pub use mock::MemoryRecordStore;
