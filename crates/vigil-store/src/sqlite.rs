//! SQLite engine-state backend.

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use vigil_core::error::{Result, VigilError};
use vigil_core::traits::store::{
    BroadcastCounter, BroadcastJobStore, ContentCache, DedupStore, RecordResult,
};
use vigil_core::types::{
    BroadcastJob, BroadcastStatus, ContentSource, ContentUnit, DedupKey, DeliveryOutcome,
    DeliveryRecord,
};

/// Engine state store. One connection behind a mutex; every statement is a
/// single round-trip, so contention stays negligible at reminder volumes.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the engine database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(|e| VigilError::Store(e.to_string()))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS delivery_records (
                dedup_key TEXT PRIMARY KEY,
                sent_at TEXT NOT NULL,
                channel TEXT NOT NULL,
                outcome TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS content_cache (
                date TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                source TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS broadcast_jobs (
                id TEXT PRIMARY KEY,
                message TEXT NOT NULL,
                created_at TEXT NOT NULL,
                status TEXT NOT NULL,
                sent INTEGER NOT NULL DEFAULT 0,
                failed INTEGER NOT NULL DEFAULT 0,
                skipped INTEGER NOT NULL DEFAULT 0,
                cancelled INTEGER NOT NULL DEFAULT 0
            );",
        )
        .map_err(|e| VigilError::Store(e.to_string()))?;

        tracing::debug!("Engine store opened: {}", path.display());
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| VigilError::Store(e.to_string()))
    }
}

#[async_trait]
impl DedupStore for SqliteStore {
    async fn was_sent(&self, key: &DedupKey) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM delivery_records WHERE dedup_key = ?1 AND outcome = 'sent'",
                params![key.to_string()],
                |row| row.get(0),
            )
            .map_err(|e| VigilError::Store(e.to_string()))?;
        Ok(count > 0)
    }

    async fn latest_outcome(&self, key: &DedupKey) -> Result<Option<DeliveryOutcome>> {
        let conn = self.lock()?;
        let outcome: Option<String> = conn
            .query_row(
                "SELECT outcome FROM delivery_records WHERE dedup_key = ?1",
                params![key.to_string()],
                |row| row.get(0),
            )
            .ok();
        outcome.map(|s| s.parse::<DeliveryOutcome>()).transpose()
    }

    async fn record(&self, record: &DeliveryRecord) -> Result<RecordResult> {
        let conn = self.lock()?;
        // The WHERE clause on the upsert is the write-guard: once a row is
        // 'sent' nothing may replace it, regardless of what the caller read
        // earlier. Failure rows may be superseded by a later attempt.
        let changed = conn
            .execute(
                "INSERT INTO delivery_records (dedup_key, sent_at, channel, outcome)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(dedup_key) DO UPDATE SET
                     sent_at = excluded.sent_at,
                     channel = excluded.channel,
                     outcome = excluded.outcome
                 WHERE delivery_records.outcome != 'sent'",
                params![
                    record.key.to_string(),
                    record.sent_at.to_rfc3339(),
                    record.channel,
                    record.outcome.as_str(),
                ],
            )
            .map_err(|e| VigilError::Store(e.to_string()))?;

        if changed == 0 {
            tracing::debug!("Dedup refused write for {} (already sent)", record.key);
            Ok(RecordResult::AlreadySent)
        } else {
            Ok(RecordResult::Recorded)
        }
    }
}

#[async_trait]
impl ContentCache for SqliteStore {
    async fn get(&self, date: NaiveDate) -> Result<Option<ContentUnit>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT body, source FROM content_cache WHERE date = ?1")
            .map_err(|e| VigilError::Store(e.to_string()))?;

        let unit = stmt
            .query_row(params![date.to_string()], |row| {
                let body: String = row.get(0)?;
                let source: String = row.get(1)?;
                Ok((body, source))
            })
            .map(|(body, source)| ContentUnit {
                date,
                body,
                source: if source == "generated" {
                    ContentSource::Generated
                } else {
                    ContentSource::Fallback
                },
            })
            .ok();
        Ok(unit)
    }

    async fn put(&self, unit: &ContentUnit) -> Result<()> {
        let conn = self.lock()?;
        // First writer wins; a concurrent caller that lost the race keeps
        // serving the cached row, which is what per-date determinism needs.
        conn.execute(
            "INSERT OR IGNORE INTO content_cache (date, body, source) VALUES (?1, ?2, ?3)",
            params![unit.date.to_string(), unit.body, unit.source.as_str()],
        )
        .map_err(|e| VigilError::Store(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl BroadcastJobStore for SqliteStore {
    async fn create(&self, job: &BroadcastJob) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO broadcast_jobs (id, message, created_at, status, sent, failed, skipped, cancelled)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                job.id,
                job.message,
                job.created_at.to_rfc3339(),
                job.status.as_str(),
                job.sent,
                job.failed,
                job.skipped,
                job.cancelled as i64,
            ],
        )
        .map_err(|e| VigilError::Store(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, job_id: &str) -> Result<Option<BroadcastJob>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, message, created_at, status, sent, failed, skipped, cancelled
                 FROM broadcast_jobs WHERE id = ?1",
            )
            .map_err(|e| VigilError::Store(e.to_string()))?;

        let row = stmt
            .query_row(params![job_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, u32>(4)?,
                    row.get::<_, u32>(5)?,
                    row.get::<_, u32>(6)?,
                    row.get::<_, i64>(7)?,
                ))
            })
            .ok();

        let Some((id, message, created_at, status, sent, failed, skipped, cancelled)) = row else {
            return Ok(None);
        };

        Ok(Some(BroadcastJob {
            id,
            message,
            created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
                .map(|d| d.with_timezone(&chrono::Utc))
                .unwrap_or_default(),
            status: status.parse::<BroadcastStatus>()?,
            sent,
            failed,
            skipped,
            cancelled: cancelled != 0,
        }))
    }

    async fn set_status(&self, job_id: &str, status: BroadcastStatus) -> Result<()> {
        let conn = self.lock()?;
        // Completed jobs are immutable; the guard makes that a no-op rather
        // than trusting every caller.
        conn.execute(
            "UPDATE broadcast_jobs SET status = ?2 WHERE id = ?1 AND status != 'completed'",
            params![job_id, status.as_str()],
        )
        .map_err(|e| VigilError::Store(e.to_string()))?;
        Ok(())
    }

    async fn increment(&self, job_id: &str, counter: BroadcastCounter) -> Result<()> {
        let column = match counter {
            BroadcastCounter::Sent => "sent",
            BroadcastCounter::Failed => "failed",
            BroadcastCounter::Skipped => "skipped",
        };
        let conn = self.lock()?;
        conn.execute(
            &format!("UPDATE broadcast_jobs SET {column} = {column} + 1 WHERE id = ?1"),
            params![job_id],
        )
        .map_err(|e| VigilError::Store(e.to_string()))?;
        Ok(())
    }

    async fn cancel(&self, job_id: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE broadcast_jobs SET cancelled = 1 WHERE id = ?1",
            params![job_id],
        )
        .map_err(|e| VigilError::Store(e.to_string()))?;
        Ok(())
    }

    async fn is_cancelled(&self, job_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let cancelled: i64 = conn
            .query_row(
                "SELECT cancelled FROM broadcast_jobs WHERE id = ?1",
                params![job_id],
                |row| row.get(0),
            )
            .map_err(|e| VigilError::Store(e.to_string()))?;
        Ok(cancelled != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn open_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteStore::open(&dir.path().join("engine.db")).expect("open");
        (dir, store)
    }

    fn key() -> DedupKey {
        DedupKey::new(
            "owner-a",
            "slot-1",
            30,
            NaiveDate::from_ymd_opt(2026, 8, 24).expect("date"),
        )
    }

    fn record(outcome: vigil_core::types::DeliveryOutcome) -> DeliveryRecord {
        DeliveryRecord {
            key: key(),
            sent_at: Utc::now(),
            channel: "telegram".into(),
            outcome,
        }
    }

    #[tokio::test]
    async fn test_second_sent_write_refused() {
        use vigil_core::types::DeliveryOutcome::Sent;
        let (_dir, store) = open_store();

        assert!(!store.was_sent(&key()).await.expect("was_sent"));
        assert_eq!(
            store.record(&record(Sent)).await.expect("record"),
            RecordResult::Recorded
        );
        assert!(store.was_sent(&key()).await.expect("was_sent"));
        assert_eq!(
            store.record(&record(Sent)).await.expect("record"),
            RecordResult::AlreadySent
        );
    }

    #[tokio::test]
    async fn test_transient_failure_does_not_block_sent() {
        use vigil_core::types::DeliveryOutcome::{FailedTransient, Sent};
        let (_dir, store) = open_store();

        store.record(&record(FailedTransient)).await.expect("record");
        assert!(!store.was_sent(&key()).await.expect("was_sent"));

        assert_eq!(
            store.record(&record(Sent)).await.expect("record"),
            RecordResult::Recorded
        );
        assert!(store.was_sent(&key()).await.expect("was_sent"));
    }

    #[tokio::test]
    async fn test_sent_survives_failure_write() {
        use vigil_core::types::DeliveryOutcome::{FailedTransient, Sent};
        let (_dir, store) = open_store();

        store.record(&record(Sent)).await.expect("record");
        assert_eq!(
            store.record(&record(FailedTransient)).await.expect("record"),
            RecordResult::AlreadySent
        );
        assert!(store.was_sent(&key()).await.expect("was_sent"));
    }

    #[tokio::test]
    async fn test_latest_outcome_progression() {
        use vigil_core::types::DeliveryOutcome::{FailedTransient, Sent};
        let (_dir, store) = open_store();

        assert!(store.latest_outcome(&key()).await.expect("outcome").is_none());

        store.record(&record(FailedTransient)).await.expect("record");
        assert_eq!(
            store.latest_outcome(&key()).await.expect("outcome"),
            Some(FailedTransient)
        );

        store.record(&record(Sent)).await.expect("record");
        assert_eq!(store.latest_outcome(&key()).await.expect("outcome"), Some(Sent));
    }

    #[tokio::test]
    async fn test_content_cache_first_write_wins() {
        let (_dir, store) = open_store();
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).expect("date");

        assert!(ContentCache::get(&store, date).await.expect("get").is_none());

        let first = ContentUnit {
            date,
            body: "first body".into(),
            source: ContentSource::Generated,
        };
        store.put(&first).await.expect("put");

        let second = ContentUnit {
            date,
            body: "second body".into(),
            source: ContentSource::Fallback,
        };
        store.put(&second).await.expect("put");

        let cached = ContentCache::get(&store, date).await.expect("get").expect("unit");
        assert_eq!(cached.body, "first body");
        assert_eq!(cached.source, ContentSource::Generated);
    }

    fn job(id: &str) -> BroadcastJob {
        BroadcastJob {
            id: id.into(),
            message: "Prayer meeting moved to 7pm".into(),
            created_at: Utc::now(),
            status: BroadcastStatus::Queued,
            sent: 0,
            failed: 0,
            skipped: 0,
            cancelled: false,
        }
    }

    #[tokio::test]
    async fn test_job_lifecycle_and_counts() {
        let (_dir, store) = open_store();
        store.create(&job("j1")).await.expect("create");

        store
            .set_status("j1", BroadcastStatus::InProgress)
            .await
            .expect("status");
        store.increment("j1", BroadcastCounter::Sent).await.expect("inc");
        store.increment("j1", BroadcastCounter::Sent).await.expect("inc");
        store.increment("j1", BroadcastCounter::Failed).await.expect("inc");
        store.increment("j1", BroadcastCounter::Skipped).await.expect("inc");
        store
            .set_status("j1", BroadcastStatus::Completed)
            .await
            .expect("status");

        let loaded = BroadcastJobStore::get(&store, "j1").await.expect("get").expect("job");
        assert_eq!(loaded.status, BroadcastStatus::Completed);
        assert_eq!(loaded.sent, 2);
        assert_eq!(loaded.failed, 1);
        assert_eq!(loaded.skipped, 1);
        assert_eq!(loaded.attempted(), 4);
    }

    #[tokio::test]
    async fn test_completed_job_is_immutable() {
        let (_dir, store) = open_store();
        store.create(&job("j2")).await.expect("create");
        store
            .set_status("j2", BroadcastStatus::Completed)
            .await
            .expect("status");
        store
            .set_status("j2", BroadcastStatus::InProgress)
            .await
            .expect("status");

        let loaded = BroadcastJobStore::get(&store, "j2").await.expect("get").expect("job");
        assert_eq!(loaded.status, BroadcastStatus::Completed);
    }

    #[tokio::test]
    async fn test_cancel_flag() {
        let (_dir, store) = open_store();
        store.create(&job("j3")).await.expect("create");
        assert!(!store.is_cancelled("j3").await.expect("flag"));
        store.cancel("j3").await.expect("cancel");
        assert!(store.is_cancelled("j3").await.expect("flag"));
    }

    #[tokio::test]
    async fn test_get_missing_job() {
        let (_dir, store) = open_store();
        assert!(BroadcastJobStore::get(&store, "nope").await.expect("get").is_none());
    }
}
