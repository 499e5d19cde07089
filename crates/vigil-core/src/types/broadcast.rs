//! Broadcast job state.

use crate::error::{Result, VigilError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a broadcast job. Strictly forward:
/// queued → in_progress → completed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BroadcastStatus {
    Queued,
    InProgress,
    Completed,
}

impl BroadcastStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BroadcastStatus::Queued => "queued",
            BroadcastStatus::InProgress => "in_progress",
            BroadcastStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for BroadcastStatus {
    type Err = VigilError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "queued" => Ok(BroadcastStatus::Queued),
            "in_progress" => Ok(BroadcastStatus::InProgress),
            "completed" => Ok(BroadcastStatus::Completed),
            other => Err(VigilError::Store(format!("Unknown job status: {other}"))),
        }
    }
}

/// A one-shot fan-out of a single authored message to all active
/// subscribers. Terminal once every subscriber has been attempted exactly
/// once; never resumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastJob {
    pub id: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub status: BroadcastStatus,
    pub sent: u32,
    pub failed: u32,
    pub skipped: u32,
    pub cancelled: bool,
}

impl BroadcastJob {
    /// Total recipients attempted (or accounted for) so far.
    pub fn attempted(&self) -> u32 {
        self.sent + self.failed + self.skipped
    }

    pub fn is_terminal(&self) -> bool {
        self.status == BroadcastStatus::Completed
    }
}
