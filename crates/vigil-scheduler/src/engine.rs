//! The tick-driven poller.

use crate::evaluate;
use chrono::{DateTime, Datelike, FixedOffset, Offset, Utc};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use vigil_content::ContentProvider;
use vigil_core::config::SchedulerConfig;
use vigil_core::error::Result;
use vigil_core::traits::store::RecordResult;
use vigil_core::traits::{DedupStore, Dispatcher, PreferenceRegistry, SlotRegistry, SubscriberRegistry};
use vigil_core::types::{DedupKey, DeliveryOutcome, DeliveryRecord, ReminderPreference, Slot};

/// The poller. Each tick is a self-contained pass: nothing carries over
/// between ticks except what the dedup store persisted.
pub struct SchedulerEngine {
    config: SchedulerConfig,
    slots: Arc<dyn SlotRegistry>,
    prefs: Arc<dyn PreferenceRegistry>,
    subscribers: Arc<dyn SubscriberRegistry>,
    content: Arc<ContentProvider>,
    dispatcher: Arc<dyn Dispatcher>,
    dedup: Arc<dyn DedupStore>,
    /// Serializes ticks. Two ticks racing the same dedup keys could both
    /// pass the read before either write lands, so overlap is skipped, not
    /// queued.
    tick_lock: tokio::sync::Mutex<()>,
}

impl SchedulerEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: SchedulerConfig,
        slots: Arc<dyn SlotRegistry>,
        prefs: Arc<dyn PreferenceRegistry>,
        subscribers: Arc<dyn SubscriberRegistry>,
        content: Arc<ContentProvider>,
        dispatcher: Arc<dyn Dispatcher>,
        dedup: Arc<dyn DedupStore>,
    ) -> Self {
        Self {
            config,
            slots,
            prefs,
            subscribers,
            content,
            dispatcher,
            dedup,
            tick_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Run the poller until the task is cancelled.
    pub async fn run(&self) -> Result<()> {
        let mut interval = tokio::time::interval(Duration::from_secs(self.config.tick_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(
            "Scheduler running: tick every {}s, tolerance {}s",
            self.config.tick_secs,
            self.config.tolerance_secs()
        );

        loop {
            interval.tick().await;
            if let Err(e) = self.tick(Utc::now()).await {
                tracing::error!("Tick failed: {e}");
            }
        }
    }

    /// One self-contained pass over all active slots. Public so tests (and
    /// an operator one-shot) can drive it with an explicit clock.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<()> {
        let Ok(_guard) = self.tick_lock.try_lock() else {
            tracing::warn!("Previous tick still running, skipping this one");
            return Ok(());
        };

        let slots = self.slots.list_active_slots().await?;
        tracing::debug!("Tick at {now}: {} active slots", slots.len());

        futures::stream::iter(slots)
            .for_each_concurrent(self.config.concurrency, |slot| async move {
                let slot_id = slot.id.clone();
                if let Err(e) = self.process_slot(&slot, now).await {
                    // One slot's failure never aborts the rest of the tick.
                    tracing::warn!("Slot {slot_id}: {e}");
                }
            })
            .await;
        Ok(())
    }

    async fn process_slot(&self, slot: &Slot, now: DateTime<Utc>) -> Result<()> {
        let pref = self
            .prefs
            .preference(&slot.owner_id)
            .await?
            .unwrap_or_else(|| ReminderPreference::default_for(slot.owner_id.clone()));

        let tz = self.owner_timezone(&pref);
        let local = now.with_timezone(&tz);

        if !evaluate::should_fire(
            slot.start_time,
            &pref,
            local.time(),
            local.weekday(),
            self.config.tolerance_secs(),
        ) {
            return Ok(());
        }

        let key = DedupKey::new(
            slot.owner_id.clone(),
            slot.id.clone(),
            pref.normalized_offset(),
            local.date_naive(),
        );

        match self.dedup.latest_outcome(&key).await? {
            Some(DeliveryOutcome::Sent) | Some(DeliveryOutcome::FailedPermanent) => {
                return Ok(());
            }
            // Transient failure from an earlier tick: one more try while
            // the window is still open.
            Some(DeliveryOutcome::FailedTransient) | None => {}
        }

        let Some(recipient) = self.subscribers.recipient(&slot.owner_id).await? else {
            tracing::warn!("No contact record for {}, reminder dropped", slot.owner_id);
            return Ok(());
        };
        let Some(address) = recipient.address else {
            tracing::warn!("{} has no channel address, reminder dropped", slot.owner_id);
            return Ok(());
        };

        let unit = self.content.daily(local.date_naive()).await?;
        let body = format!(
            "Your prayer slot begins at {} (in {} minutes).\n\n{}",
            slot.start_time.format("%H:%M"),
            pref.normalized_offset(),
            unit.body
        );

        // The dedup record is written after the attempt, whatever the
        // outcome, so a crash between check and send costs at most one
        // retried window, never a silent loss.
        let outcome = match self.dispatcher.send(&address, &body).await {
            Ok(()) => {
                tracing::info!("Reminder sent: {key}");
                DeliveryOutcome::Sent
            }
            Err(e) if e.is_transient() => {
                tracing::warn!("Transient delivery failure for {key}: {e}");
                DeliveryOutcome::FailedTransient
            }
            Err(e) => {
                tracing::warn!("Permanent delivery failure for {key}: {e}");
                DeliveryOutcome::FailedPermanent
            }
        };

        let record = DeliveryRecord {
            key: key.clone(),
            sent_at: now,
            channel: self.dispatcher.name().to_string(),
            outcome,
        };
        if self.dedup.record(&record).await? == RecordResult::AlreadySent {
            tracing::debug!("Lost dedup race for {key}, another writer sent first");
        }
        Ok(())
    }

    fn owner_timezone(&self, pref: &ReminderPreference) -> FixedOffset {
        let minutes = pref
            .utc_offset_minutes
            .unwrap_or(self.config.default_utc_offset_minutes);
        FixedOffset::east_opt(minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}
