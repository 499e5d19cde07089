//! Prayer slots, reminder preferences, and recipients.
//!
//! Slots and preferences are owned by the platform's slot-management side;
//! the engine only reads them through the registries.

use crate::error::{Result, VigilError};
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Reminder offsets (minutes before slot start) the platform supports.
pub const SUPPORTED_OFFSETS: [u32; 4] = [5, 15, 30, 60];

/// Default offset applied when a preference is absent or out of range.
pub const DEFAULT_OFFSET_MINUTES: u32 = 30;

/// Lifecycle status of a slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Active,
    Paused,
    Released,
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotStatus::Active => write!(f, "active"),
            SlotStatus::Paused => write!(f, "paused"),
            SlotStatus::Released => write!(f, "released"),
        }
    }
}

impl std::str::FromStr for SlotStatus {
    type Err = VigilError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(SlotStatus::Active),
            "paused" => Ok(SlotStatus::Paused),
            "released" => Ok(SlotStatus::Released),
            other => Err(VigilError::Registry(format!("Unknown slot status: {other}"))),
        }
    }
}

/// A recurring time-of-day commitment owned by one participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,
    pub owner_id: String,
    /// Wall-clock start, local to the owner.
    pub start_time: NaiveTime,
    pub status: SlotStatus,
}

/// Parse a `HH:MM` wall-clock time as stored by the platform.
pub fn parse_start_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| VigilError::Registry(format!("Invalid start time '{s}': {e}")))
}

/// Parse a comma-separated weekday list (e.g. `"mon,wed,fri"`). Unknown
/// tokens are dropped rather than failing the whole preference — a
/// malformed day list degrades to "all days" downstream.
pub fn parse_active_days(s: &str) -> Vec<Weekday> {
    s.split(',')
        .filter_map(|tok| tok.trim().parse::<Weekday>().ok())
        .collect()
}

/// Per-participant reminder settings. Created lazily with defaults when the
/// registry has no row for the owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderPreference {
    pub owner_id: String,
    pub offset_minutes: u32,
    /// Weekdays on which reminders are wanted. Empty means every day.
    pub active_days: Vec<Weekday>,
    pub enabled: bool,
    /// UTC offset of the participant's local clock, in minutes.
    pub utc_offset_minutes: Option<i32>,
}

impl ReminderPreference {
    /// Defaults for a participant with no stored preference.
    pub fn default_for(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            offset_minutes: DEFAULT_OFFSET_MINUTES,
            active_days: Vec::new(),
            enabled: true,
            utc_offset_minutes: None,
        }
    }

    /// Offset clamped to the supported set; anything else means 30.
    pub fn normalized_offset(&self) -> u32 {
        if SUPPORTED_OFFSETS.contains(&self.offset_minutes) {
            self.offset_minutes
        } else {
            DEFAULT_OFFSET_MINUTES
        }
    }

    /// Whether reminders are wanted on the given weekday. An empty day list
    /// fails open: every day is eligible.
    pub fn active_on(&self, day: Weekday) -> bool {
        self.active_days.is_empty() || self.active_days.contains(&day)
    }
}

/// A broadcast recipient. A recipient without a channel address is counted
/// as skipped, never attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
    pub name: Option<String>,
    pub address: Option<String>,
}
