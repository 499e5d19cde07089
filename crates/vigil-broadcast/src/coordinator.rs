//! The broadcast fan-out coordinator.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use vigil_content::ContentProvider;
use vigil_core::config::BroadcastConfig;
use vigil_core::error::{Result, VigilError};
use vigil_core::traits::store::{BroadcastCounter, BroadcastJobStore};
use vigil_core::traits::{Dispatcher, SubscriberRegistry};
use vigil_core::types::{BroadcastJob, BroadcastStatus};

/// Drives one broadcast job from `queued` to `completed`. Runs in its own
/// concurrency domain, independent of the scheduler; the only shared piece
/// is the dispatcher, which is why sends are paced with a minimum delay to
/// stay under the channel's throughput ceiling.
pub struct BroadcastCoordinator {
    config: BroadcastConfig,
    subscribers: Arc<dyn SubscriberRegistry>,
    content: Arc<ContentProvider>,
    dispatcher: Arc<dyn Dispatcher>,
    jobs: Arc<dyn BroadcastJobStore>,
}

impl BroadcastCoordinator {
    pub fn new(
        config: BroadcastConfig,
        subscribers: Arc<dyn SubscriberRegistry>,
        content: Arc<ContentProvider>,
        dispatcher: Arc<dyn Dispatcher>,
        jobs: Arc<dyn BroadcastJobStore>,
    ) -> Self {
        Self { config, subscribers, content, dispatcher, jobs }
    }

    /// Create a job for the authored message and return its id. The job
    /// sits in `queued` until [`run`](Self::run) picks it up.
    pub async fn start(&self, message: &str) -> Result<String> {
        let job = BroadcastJob {
            id: Uuid::new_v4().to_string(),
            message: message.to_string(),
            created_at: Utc::now(),
            status: BroadcastStatus::Queued,
            sent: 0,
            failed: 0,
            skipped: 0,
            cancelled: false,
        };
        self.jobs.create(&job).await?;
        tracing::info!("Broadcast job {} queued", job.id);
        Ok(job.id)
    }

    /// Run a queued job to completion: every active subscriber is attempted
    /// exactly once, counts are persisted as the run progresses, and the
    /// cancel flag is checked between sends. Failures are contained per
    /// recipient; nothing here is ever retried automatically.
    pub async fn run(&self, job_id: &str) -> Result<BroadcastJob> {
        let job = self
            .jobs
            .get(job_id)
            .await?
            .ok_or_else(|| VigilError::store(format!("Unknown broadcast job: {job_id}")))?;
        match job.status {
            BroadcastStatus::Queued => {}
            // Completed jobs are immutable; hand back the final report.
            BroadcastStatus::Completed => return Ok(job),
            // A job stuck in_progress (crashed run, duplicate call) is never
            // resumed: re-attempting recipients would double-send and push
            // the counts past the subscriber total.
            BroadcastStatus::InProgress => {
                return Err(VigilError::store(format!(
                    "Broadcast job {job_id} is already in progress and is never resumed"
                )));
            }
        }

        self.jobs.set_status(job_id, BroadcastStatus::InProgress).await?;
        let recipients = self.subscribers.list_active_subscribers().await?;
        tracing::info!("Broadcast {job_id}: {} active subscribers", recipients.len());

        let mut attempted_send = false;
        for recipient in &recipients {
            if self.jobs.is_cancelled(job_id).await? {
                tracing::info!("Broadcast {job_id} cancelled, stopping with partial counts");
                break;
            }

            let Some(address) = recipient.address.as_deref() else {
                self.jobs.increment(job_id, BroadcastCounter::Skipped).await?;
                continue;
            };

            // Pacing applies between dispatch attempts only; skipped
            // recipients cost the channel nothing.
            if attempted_send {
                tokio::time::sleep(Duration::from_millis(self.config.send_delay_ms)).await;
            }
            attempted_send = true;

            let body = self.content.personalize(&job.message, recipient);
            match self.dispatcher.send(address, &body).await {
                Ok(()) => {
                    self.jobs.increment(job_id, BroadcastCounter::Sent).await?;
                }
                Err(e) => {
                    tracing::warn!("Broadcast {job_id}: send to {} failed: {e}", recipient.id);
                    self.jobs.increment(job_id, BroadcastCounter::Failed).await?;
                }
            }
        }

        self.jobs.set_status(job_id, BroadcastStatus::Completed).await?;
        let done = self
            .jobs
            .get(job_id)
            .await?
            .ok_or_else(|| VigilError::store(format!("Job {job_id} vanished mid-run")))?;
        tracing::info!(
            "Broadcast {job_id} completed: {} sent, {} failed, {} skipped",
            done.sent,
            done.failed,
            done.skipped
        );
        Ok(done)
    }

    /// Aggregate counts only; per-recipient diagnostics stay in the logs.
    pub async fn status(&self, job_id: &str) -> Result<Option<BroadcastJob>> {
        self.jobs.get(job_id).await
    }

    /// Flip the durable cancel flag. The running coordinator notices it
    /// between sends; messages already delivered are not undone.
    pub async fn cancel(&self, job_id: &str) -> Result<()> {
        self.jobs.cancel(job_id).await
    }
}
