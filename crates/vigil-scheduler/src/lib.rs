//! # Vigil Scheduler
//!
//! One periodic scan replaces per-slot timers: every tick loads the active
//! slots, evaluates each against its owner's preference and the dedup
//! store, and dispatches the reminders whose trigger window is open right
//! now. State lives in the store, not in timers, so a restart can never
//! drop or duplicate a reminder.
//!
//! ```text
//! SchedulerEngine (tokio interval, run-lock serialized)
//!   └── per active slot (bounded concurrency)
//!         ├── ReminderPreference (defaults when absent)
//!         ├── evaluate: availability + trigger window
//!         ├── DedupStore: outcome for today's key
//!         ├── ContentProvider: daily body (generated or fallback)
//!         ├── Dispatcher: send
//!         └── DedupStore: record outcome
//! ```

pub mod engine;
pub mod evaluate;

pub use engine::SchedulerEngine;
pub use evaluate::{should_fire, trigger_time};
