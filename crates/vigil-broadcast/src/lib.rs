//! # Vigil Broadcast
//!
//! Fans a single authored message out to every active subscriber. A
//! broadcast is an explicit job with a durable, queryable state
//! (queued → in_progress → completed), not a fire-and-forget task: counts
//! are persisted as the run progresses, every subscriber is attempted
//! exactly once, and a cancel flag checked between sends stops the run
//! early with partial figures.

pub mod coordinator;

pub use coordinator::BroadcastCoordinator;
