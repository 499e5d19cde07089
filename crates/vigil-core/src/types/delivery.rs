//! Delivery records and the dedup key that identifies one reminder
//! opportunity.

use crate::error::{Result, VigilError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The unique tuple identifying one reminder opportunity:
/// (participant, slot, offset, calendar date).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub owner_id: String,
    pub slot_id: String,
    pub offset_minutes: u32,
    pub date: NaiveDate,
}

impl DedupKey {
    pub fn new(
        owner_id: impl Into<String>,
        slot_id: impl Into<String>,
        offset_minutes: u32,
        date: NaiveDate,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            slot_id: slot_id.into(),
            offset_minutes,
            date,
        }
    }
}

impl std::fmt::Display for DedupKey {
    /// Canonical form used as the store's primary key.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.owner_id, self.slot_id, self.offset_minutes, self.date
        )
    }
}

/// Outcome of a single dispatch attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Sent,
    FailedTransient,
    FailedPermanent,
}

impl DeliveryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOutcome::Sent => "sent",
            DeliveryOutcome::FailedTransient => "failed_transient",
            DeliveryOutcome::FailedPermanent => "failed_permanent",
        }
    }
}

impl std::str::FromStr for DeliveryOutcome {
    type Err = VigilError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sent" => Ok(DeliveryOutcome::Sent),
            "failed_transient" => Ok(DeliveryOutcome::FailedTransient),
            "failed_permanent" => Ok(DeliveryOutcome::FailedPermanent),
            other => Err(VigilError::Store(format!("Unknown outcome: {other}"))),
        }
    }
}

/// Durable record of one reminder opportunity's outcome. At most one `Sent`
/// record may ever exist for a given key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub key: DedupKey,
    pub sent_at: DateTime<Utc>,
    pub channel: String,
    pub outcome: DeliveryOutcome,
}
