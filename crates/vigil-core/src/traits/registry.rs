//! Read-only registries owned by the rest of the platform.
//!
//! The engine never writes through these; slot and preference mutation is
//! an external concern.

use crate::error::Result;
use crate::types::{Recipient, ReminderPreference, Slot};
use async_trait::async_trait;

#[async_trait]
pub trait SlotRegistry: Send + Sync {
    /// All slots currently in `active` status.
    async fn list_active_slots(&self) -> Result<Vec<Slot>>;
}

#[async_trait]
pub trait PreferenceRegistry: Send + Sync {
    /// The owner's reminder preference, or `None` when never configured.
    /// Callers apply `ReminderPreference::default_for` on `None`.
    async fn preference(&self, owner_id: &str) -> Result<Option<ReminderPreference>>;
}

#[async_trait]
pub trait SubscriberRegistry: Send + Sync {
    /// Everyone eligible for a broadcast fan-out.
    async fn list_active_subscribers(&self) -> Result<Vec<Recipient>>;

    /// Contact record for a single participant (reminder delivery path).
    async fn recipient(&self, id: &str) -> Result<Option<Recipient>>;
}
