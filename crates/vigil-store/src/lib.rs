//! # Vigil Store
//!
//! SQLite-backed persistence for the engine's durable state. Three concerns
//! live here:
//!
//! - the Dedup Store (`delivery_records`) — the uniqueness constraint on
//!   `dedup_key` is what prevents double sends, not read-then-write,
//! - the daily content cache (`content_cache`),
//! - broadcast job state (`broadcast_jobs`),
//!
//! plus read-only registries over the platform's own tables (slots,
//! preferences, subscribers), which the engine never migrates or writes.

pub mod registry;
pub mod sqlite;

pub use registry::SqliteRegistry;
pub use sqlite::SqliteStore;
