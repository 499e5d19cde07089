//! Domain types shared across the engine crates.

mod broadcast;
mod content;
mod delivery;
mod slot;

pub use broadcast::{BroadcastJob, BroadcastStatus};
pub use content::{ContentSource, ContentUnit};
pub use delivery::{DedupKey, DeliveryOutcome, DeliveryRecord};
pub use slot::{parse_active_days, parse_start_time, Recipient, ReminderPreference, Slot, SlotStatus};
