//! Durable state capabilities: dedup records, daily content cache, and
//! broadcast jobs.

use crate::error::Result;
use crate::types::{
    BroadcastJob, BroadcastStatus, ContentUnit, DedupKey, DeliveryOutcome, DeliveryRecord,
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Result of writing a delivery record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordResult {
    Recorded,
    /// A `Sent` record already existed for this key; the write was refused
    /// by the store's uniqueness discipline, not by a prior read.
    AlreadySent,
}

/// Durable "notification already sent" facts.
#[async_trait]
pub trait DedupStore: Send + Sync {
    async fn was_sent(&self, key: &DedupKey) -> Result<bool>;

    /// The recorded outcome for this key, if any attempt was made. `Sent`
    /// and `FailedPermanent` both close the opportunity; `FailedTransient`
    /// leaves it open for one same-window retry.
    async fn latest_outcome(&self, key: &DedupKey) -> Result<Option<DeliveryOutcome>>;

    /// Record a dispatch attempt. A `Sent` outcome wins exactly once per
    /// key; later `Sent` writes return [`RecordResult::AlreadySent`]. A
    /// transient failure does not block a later `Sent` for the same key.
    async fn record(&self, record: &DeliveryRecord) -> Result<RecordResult>;
}

/// Per-date content cache. One generation per day, fanned out to many.
#[async_trait]
pub trait ContentCache: Send + Sync {
    async fn get(&self, date: NaiveDate) -> Result<Option<ContentUnit>>;

    async fn put(&self, unit: &ContentUnit) -> Result<()>;
}

/// Which aggregate counter a broadcast attempt lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastCounter {
    Sent,
    Failed,
    Skipped,
}

/// Broadcast job persistence. Counts are written progressively so a status
/// query during a run sees partial figures.
#[async_trait]
pub trait BroadcastJobStore: Send + Sync {
    async fn create(&self, job: &BroadcastJob) -> Result<()>;

    async fn get(&self, job_id: &str) -> Result<Option<BroadcastJob>>;

    async fn set_status(&self, job_id: &str, status: BroadcastStatus) -> Result<()>;

    async fn increment(&self, job_id: &str, counter: BroadcastCounter) -> Result<()>;

    /// Flip the durable cancel flag. The coordinator checks it between
    /// sends; already-sent messages are not undone.
    async fn cancel(&self, job_id: &str) -> Result<()>;

    async fn is_cancelled(&self, job_id: &str) -> Result<bool>;
}
