use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::{migrations, Ledger, MessageRecord};
use crate::{
    domain::{RecordId, UserId},
    errors::Error,
    Result,
};

/// Written format of the `timestamp` column (local time, microseconds).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const TIMESTAMP_FORMAT_NO_FRACTION: &str = "%Y-%m-%d %H:%M:%S";

/// SQLite-backed ledger.
///
/// A single connection sits behind a mutex; every call runs on the blocking
/// pool so the async runtime never waits on disk I/O.
pub struct SqliteLedger {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLedger {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL for concurrent readers, FULL so a committed write survives a crash.
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "FULL")?;

        migrations::run(&conn)?;

        info!(path = %path.display(), journal_mode = %mode, "ledger opened");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|e| Error::Storage(format!("ledger lock poisoned: {e}")))?;
            f(&guard)
        })
        .await
        .map_err(|e| Error::Storage(format!("ledger task failed: {e}")))?
    }
}

#[async_trait]
impl Ledger for SqliteLedger {
    async fn record(&self, user_id: UserId, username: &str, text: &str) -> Result<RecordId> {
        let username = username.to_string();
        let text = text.to_string();
        let timestamp = Local::now()
            .naive_local()
            .format(TIMESTAMP_FORMAT)
            .to_string();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO messages (user_id, username, message_text, timestamp)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id.0, username, text, timestamp],
            )?;
            Ok(RecordId(conn.last_insert_rowid()))
        })
        .await
    }

    async fn mark_forwarded(&self, id: RecordId) -> Result<()> {
        self.with_conn(move |conn| {
            conn.execute(
                "UPDATE messages SET forwarded = 1 WHERE id = ?1",
                params![id.0],
            )?;
            Ok(())
        })
        .await
    }

    async fn count_all(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
            Ok(n as u64)
        })
        .await
    }

    async fn count_forwarded(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE forwarded = 1",
                [],
                |row| row.get(0),
            )?;
            Ok(n as u64)
        })
        .await
    }

    async fn get(&self, id: RecordId) -> Result<Option<MessageRecord>> {
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    "SELECT id, user_id, username, message_text, timestamp, forwarded
                     FROM messages WHERE id = ?1",
                    params![id.0],
                    |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, Option<i64>>(1)?,
                            row.get::<_, Option<String>>(2)?,
                            row.get::<_, Option<String>>(3)?,
                            row.get::<_, Option<String>>(4)?,
                            row.get::<_, Option<i64>>(5)?,
                        ))
                    },
                )
                .optional()?;

            let Some((id, user_id, username, message_text, timestamp, forwarded)) = row else {
                return Ok(None);
            };

            Ok(Some(MessageRecord {
                id: RecordId(id),
                user_id: UserId(user_id.unwrap_or_default()),
                username: username.unwrap_or_default(),
                message_text: message_text.unwrap_or_default(),
                timestamp: parse_timestamp(timestamp.as_deref().unwrap_or_default())?,
                forwarded: forwarded.unwrap_or(0) != 0,
            }))
        })
        .await
    }
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT_NO_FRACTION))
        .map_err(|e| Error::Storage(format!("bad timestamp {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[tokio::test]
    async fn record_assigns_increasing_ids_and_unforwarded_rows() {
        let ledger = SqliteLedger::open_in_memory().unwrap();

        let first = ledger.record(UserId(42), "alice", "hello").await.unwrap();
        let second = ledger.record(UserId(7), "bob", "hi there").await.unwrap();
        assert_eq!(first, RecordId(1));
        assert!(second > first);

        let rec = ledger.get(first).await.unwrap().unwrap();
        assert_eq!(rec.user_id, UserId(42));
        assert_eq!(rec.username, "alice");
        assert_eq!(rec.message_text, "hello");
        assert!(!rec.forwarded);
    }

    #[tokio::test]
    async fn mark_forwarded_is_idempotent_and_ignores_unknown_ids() {
        let ledger = SqliteLedger::open_in_memory().unwrap();
        let id = ledger.record(UserId(1), "u", "text").await.unwrap();

        ledger.mark_forwarded(id).await.unwrap();
        let once = ledger.get(id).await.unwrap();
        ledger.mark_forwarded(id).await.unwrap();
        let twice = ledger.get(id).await.unwrap();
        assert_eq!(once, twice);
        assert!(twice.unwrap().forwarded);

        ledger.mark_forwarded(RecordId(999)).await.unwrap();
        assert_eq!(ledger.count_all().await.unwrap(), 1);
        assert_eq!(ledger.count_forwarded().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn stats_counts_total_and_forwarded() {
        let ledger = SqliteLedger::open_in_memory().unwrap();
        let a = ledger.record(UserId(1), "a", "one").await.unwrap();
        ledger.record(UserId(2), "b", "two").await.unwrap();
        ledger.mark_forwarded(a).await.unwrap();

        let stats = ledger.stats().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.forwarded, 1);
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("messages.db");

        let id = {
            let ledger = SqliteLedger::open(&path).unwrap();
            let id = ledger.record(UserId(5), "carol", "persist me").await.unwrap();
            ledger.mark_forwarded(id).await.unwrap();
            id
        };

        let ledger = SqliteLedger::open(&path).unwrap();
        let rec = ledger.get(id).await.unwrap().unwrap();
        assert_eq!(rec.message_text, "persist me");
        assert!(rec.forwarded);

        let next = ledger.record(UserId(5), "carol", "again").await.unwrap();
        assert!(next > id);
    }

    #[tokio::test]
    async fn concurrent_records_get_unique_ids() {
        let ledger = Arc::new(SqliteLedger::open_in_memory().unwrap());

        let mut handles = Vec::new();
        for i in 0..32 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger
                    .record(UserId(i), "user", &format!("message {i}"))
                    .await
                    .unwrap()
            }));
        }

        let mut ids = HashSet::new();
        for h in handles {
            assert!(ids.insert(h.await.unwrap()));
        }
        assert_eq!(ledger.count_all().await.unwrap(), 32);
    }

    #[tokio::test]
    async fn reads_rows_written_without_fractional_seconds() {
        let ledger = SqliteLedger::open_in_memory().unwrap();
        {
            let conn = ledger.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO messages (user_id, username, message_text, timestamp, forwarded)
                 VALUES (3, 'dave', 'old row', '2024-03-01 18:30:05', 1)",
                [],
            )
            .unwrap();
        }

        let rec = ledger.get(RecordId(1)).await.unwrap().unwrap();
        assert_eq!(
            rec.timestamp,
            NaiveDateTime::parse_from_str("2024-03-01 18:30:05", TIMESTAMP_FORMAT_NO_FRACTION)
                .unwrap()
        );
        assert!(rec.forwarded);
    }

    #[test]
    fn written_timestamps_parse_back() {
        let now = Local::now().naive_local();
        let raw = now.format(TIMESTAMP_FORMAT).to_string();
        let parsed = parse_timestamp(&raw).unwrap();
        assert_eq!(parsed.and_utc().timestamp_micros(), now.and_utc().timestamp_micros());
    }
}
