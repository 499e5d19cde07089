//! # Vigil Content
//!
//! Produces the message bodies the engine sends. Two sources sit behind one
//! decision point: AI generation (bounded timeout, length budget) and a
//! deterministic fallback pool that needs no external dependency. Whatever
//! wins is cached per calendar date — one generation per day, fanned out to
//! every recipient.

pub mod fallback;
pub mod provider;

pub use fallback::FallbackPool;
pub use provider::ContentProvider;
