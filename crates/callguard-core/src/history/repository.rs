//! Decision log repository: the audit trail of blocked calls.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tokio::sync::watch;
use tracing::debug;

use super::model::DecisionLogEntry;
use crate::Result;

/// Append-only log of blocking decisions.
///
/// Entries are never updated in place; the only deletion is [`clear`](Self::clear).
#[derive(Clone)]
pub struct DecisionLog {
    pool: SqlitePool,
    revision: Arc<watch::Sender<u64>>,
}

impl DecisionLog {
    /// Create a new log with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        Self::with_pool(pool).await
    }

    /// Create an in-memory log for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        let (revision, _) = watch::channel(0);
        let log = Self {
            pool,
            revision: Arc::new(revision),
        };
        log.initialize().await?;
        Ok(log)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS blocked_call_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                phone_number TEXT NOT NULL,
                reason TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Index for newest-first listing
        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_blocked_call_log_timestamp
            ON blocked_call_log(timestamp DESC)
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Subscribe to log changes.
    ///
    /// The receiver observes a revision counter that advances after every
    /// append and clear.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn notify(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    /// Record a block that happened now.
    ///
    /// Returns the id assigned to the new entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn append(&self, phone_number: &str, reason: &str) -> Result<i64> {
        self.append_at(phone_number, reason, Utc::now()).await
    }

    /// Record a block that happened at the given time.
    ///
    /// Returns the id assigned to the new entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn append_at(
        &self,
        phone_number: &str,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<i64> {
        let result = sqlx::query(
            r"
            INSERT INTO blocked_call_log (phone_number, reason, timestamp)
            VALUES (?, ?, ?)
            ",
        )
        .bind(phone_number)
        .bind(reason)
        .bind(at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, phone_number, reason, "Decision logged");
        self.notify();
        Ok(id)
    }

    /// Store an entry with an explicit id.
    ///
    /// An existing entry with the same id is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn insert_or_replace(&self, entry: &DecisionLogEntry) -> Result<()> {
        sqlx::query(
            r"
            INSERT OR REPLACE INTO blocked_call_log (id, phone_number, reason, timestamp)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(entry.id)
        .bind(&entry.phone_number)
        .bind(&entry.reason)
        .bind(entry.timestamp_millis)
        .execute(&self.pool)
        .await?;

        self.notify();
        Ok(())
    }

    /// Get all entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<DecisionLogEntry>> {
        let rows = sqlx::query(
            r"
            SELECT id, phone_number, reason, timestamp
            FROM blocked_call_log
            ORDER BY timestamp DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_entry).collect())
    }

    /// Number of logged blocks.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blocked_call_log")
            .fetch_one(&self.pool)
            .await?;

        #[allow(clippy::cast_sign_loss)]
        Ok(count as u64)
    }

    /// Delete every entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn clear(&self) -> Result<()> {
        let result = sqlx::query("DELETE FROM blocked_call_log")
            .execute(&self.pool)
            .await?;

        debug!(removed = result.rows_affected(), "Decision log cleared");
        self.notify();
        Ok(())
    }
}

/// Convert a database row to a `DecisionLogEntry`.
fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> DecisionLogEntry {
    DecisionLogEntry {
        id: row.get("id"),
        phone_number: row.get("phone_number"),
        reason: row.get("reason"),
        timestamp_millis: row.get("timestamp"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[tokio::test]
    async fn test_append_and_list() {
        let log = DecisionLog::in_memory().await.unwrap();

        let id = log.append("+15550100", "Blocked number").await.unwrap();

        let entries = log.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].phone_number, "+15550100");
        assert_eq!(entries[0].reason, "Blocked number");
        assert!(entries[0].timestamp().is_some());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let log = DecisionLog::in_memory().await.unwrap();
        let now = Utc::now();

        log.append_at("+1", "Blocked prefix", now - Duration::minutes(5))
            .await
            .unwrap();
        log.append_at("+2", "Blocked prefix", now).await.unwrap();
        log.append_at("+3", "Blocked prefix", now - Duration::hours(1))
            .await
            .unwrap();

        let numbers: Vec<_> = log
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.phone_number)
            .collect();
        assert_eq!(numbers, vec!["+2", "+1", "+3"]);
    }

    #[tokio::test]
    async fn test_same_number_logged_every_time() {
        let log = DecisionLog::in_memory().await.unwrap();

        log.append("+15550100", "Blocked number").await.unwrap();
        log.append("+15550100", "Blocked number").await.unwrap();

        assert_eq!(log.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_or_replace_explicit_id() {
        let log = DecisionLog::in_memory().await.unwrap();

        let id = log.append("+15550100", "Blocked number").await.unwrap();
        log.insert_or_replace(&DecisionLogEntry {
            id,
            phone_number: "+15550199".to_string(),
            reason: "Blocked contact".to_string(),
            timestamp_millis: 42,
        })
        .await
        .unwrap();

        let entries = log.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].phone_number, "+15550199");
        assert_eq!(entries[0].timestamp_millis, 42);
    }

    #[tokio::test]
    async fn test_clear() {
        let log = DecisionLog::in_memory().await.unwrap();

        log.append("+15550100", "Blocked number").await.unwrap();
        log.append("+15550101", "Public spam database")
            .await
            .unwrap();
        log.clear().await.unwrap();

        assert!(log.list().await.unwrap().is_empty());
        assert_eq!(log.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_subscribe() {
        let log = DecisionLog::in_memory().await.unwrap();
        let mut changes = log.subscribe();

        log.append("+15550100", "Blocked number").await.unwrap();
        log.clear().await.unwrap();

        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), 2);
    }
}
