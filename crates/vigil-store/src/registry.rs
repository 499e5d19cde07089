//! Read-only registries over the platform's own tables.
//!
//! The platform side owns `slots`, `reminder_preferences`, and
//! `subscribers` (creation, migration, mutation). The engine only queries
//! them, so a row it cannot parse is skipped with a warning instead of
//! failing the whole listing.

use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use vigil_core::error::{Result, VigilError};
use vigil_core::traits::registry::{PreferenceRegistry, SlotRegistry, SubscriberRegistry};
use vigil_core::types::{
    parse_active_days, parse_start_time, Recipient, ReminderPreference, Slot, SlotStatus,
};

/// Registry handle over the shared platform database.
pub struct SqliteRegistry {
    conn: Mutex<Connection>,
}

impl SqliteRegistry {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| VigilError::Registry(e.to_string()))?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| VigilError::Registry(e.to_string()))
    }
}

#[async_trait]
impl SlotRegistry for SqliteRegistry {
    async fn list_active_slots(&self) -> Result<Vec<Slot>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, owner_id, start_time FROM slots WHERE status = 'active'")
            .map_err(|e| VigilError::Registry(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| VigilError::Registry(e.to_string()))?;

        let mut slots = Vec::new();
        for row in rows.filter_map(|r| r.ok()) {
            let (id, owner_id, start) = row;
            match parse_start_time(&start) {
                Ok(start_time) => slots.push(Slot {
                    id,
                    owner_id,
                    start_time,
                    status: SlotStatus::Active,
                }),
                Err(e) => tracing::warn!("Skipping slot {id}: {e}"),
            }
        }
        Ok(slots)
    }
}

#[async_trait]
impl PreferenceRegistry for SqliteRegistry {
    async fn preference(&self, owner_id: &str) -> Result<Option<ReminderPreference>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT offset_minutes, active_days, enabled, utc_offset_minutes
                 FROM reminder_preferences WHERE owner_id = ?1",
            )
            .map_err(|e| VigilError::Registry(e.to_string()))?;

        let pref = stmt
            .query_row(params![owner_id], |row| {
                Ok(ReminderPreference {
                    owner_id: owner_id.to_string(),
                    offset_minutes: row.get::<_, u32>(0)?,
                    active_days: parse_active_days(&row.get::<_, String>(1).unwrap_or_default()),
                    enabled: row.get::<_, i64>(2)? != 0,
                    utc_offset_minutes: row.get::<_, Option<i32>>(3)?,
                })
            })
            .ok();
        Ok(pref)
    }
}

#[async_trait]
impl SubscriberRegistry for SqliteRegistry {
    async fn list_active_subscribers(&self) -> Result<Vec<Recipient>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, name, address FROM subscribers WHERE active = 1")
            .map_err(|e| VigilError::Registry(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Recipient {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    address: row.get(2)?,
                })
            })
            .map_err(|e| VigilError::Registry(e.to_string()))?;

        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    async fn recipient(&self, id: &str) -> Result<Option<Recipient>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, name, address FROM subscribers WHERE id = ?1")
            .map_err(|e| VigilError::Registry(e.to_string()))?;

        let recipient = stmt
            .query_row(params![id], |row| {
                Ok(Recipient {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    address: row.get(2)?,
                })
            })
            .ok();
        Ok(recipient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    /// Seed a platform-shaped database the way the CRUD side would.
    fn seed_platform_db(path: &Path) {
        let conn = Connection::open(path).expect("open");
        conn.execute_batch(
            "CREATE TABLE slots (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                start_time TEXT NOT NULL,
                status TEXT NOT NULL
            );
            CREATE TABLE reminder_preferences (
                owner_id TEXT PRIMARY KEY,
                offset_minutes INTEGER NOT NULL,
                active_days TEXT NOT NULL DEFAULT '',
                enabled INTEGER NOT NULL DEFAULT 1,
                utc_offset_minutes INTEGER
            );
            CREATE TABLE subscribers (
                id TEXT PRIMARY KEY,
                name TEXT,
                address TEXT,
                active INTEGER NOT NULL DEFAULT 1
            );

            INSERT INTO slots VALUES ('s1', 'alice', '06:00', 'active');
            INSERT INTO slots VALUES ('s2', 'bob', '14:00', 'paused');
            INSERT INTO slots VALUES ('s3', 'carol', 'bogus', 'active');
            INSERT INTO reminder_preferences VALUES ('alice', 15, 'mon,wed,fri', 1, 180);
            INSERT INTO subscribers VALUES ('alice', 'Alice', '1001', 1);
            INSERT INTO subscribers VALUES ('bob', NULL, NULL, 1);
            INSERT INTO subscribers VALUES ('dan', 'Dan', '1003', 0);",
        )
        .expect("seed");
    }

    #[tokio::test]
    async fn test_active_slots_skip_paused_and_malformed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("platform.db");
        seed_platform_db(&path);

        let registry = SqliteRegistry::open(&path).expect("open");
        let slots = registry.list_active_slots().await.expect("list");
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].id, "s1");
        assert_eq!(slots[0].owner_id, "alice");
    }

    #[tokio::test]
    async fn test_preference_lookup_and_absence() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("platform.db");
        seed_platform_db(&path);

        let registry = SqliteRegistry::open(&path).expect("open");
        let pref = registry.preference("alice").await.expect("query").expect("row");
        assert_eq!(pref.offset_minutes, 15);
        assert_eq!(pref.active_days, vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]);
        assert_eq!(pref.utc_offset_minutes, Some(180));

        assert!(registry.preference("nobody").await.expect("query").is_none());
    }

    #[tokio::test]
    async fn test_active_subscribers_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("platform.db");
        seed_platform_db(&path);

        let registry = SqliteRegistry::open(&path).expect("open");
        let subs = registry.list_active_subscribers().await.expect("list");
        assert_eq!(subs.len(), 2);
        assert!(subs.iter().any(|s| s.id == "alice" && s.address.as_deref() == Some("1001")));
        assert!(subs.iter().any(|s| s.id == "bob" && s.address.is_none()));
    }

    #[tokio::test]
    async fn test_single_recipient_lookup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("platform.db");
        seed_platform_db(&path);

        let registry = SqliteRegistry::open(&path).expect("open");
        let alice = registry.recipient("alice").await.expect("query").expect("row");
        assert_eq!(alice.name.as_deref(), Some("Alice"));
        assert_eq!(alice.address.as_deref(), Some("1001"));
        assert!(registry.recipient("nobody").await.expect("query").is_none());
    }
}
