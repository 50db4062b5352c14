//! # mionjo-storage
//!
//! Object-storage backends for mionjo report files: the Supabase Storage
//! REST client used in production and an in-memory store for tests. Both
//! implement `mionjo_core::ObjectStore`.

pub mod memory;
pub mod supabase;

pub use memory::MemoryObjectStore;
pub use supabase::SupabaseStorage;
