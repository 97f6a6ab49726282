//! Rule repository for persistent storage of blocked numbers, prefixes and contacts.

use std::sync::Arc;

use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tokio::sync::watch;
use tracing::debug;

use super::model::{BlockedContact, BlockedNumber, BlockedPrefix, RuleId, RuleSnapshot, RuleSummary};
use crate::Result;
use crate::decision::normalize;

/// Repository for blocking rules.
///
/// Cloning is cheap; clones share the same connection pool and change feed.
#[derive(Clone)]
pub struct RuleRepository {
    pool: SqlitePool,
    revision: Arc<watch::Sender<u64>>,
}

impl RuleRepository {
    /// Create a new repository with the given database path.
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

    /// Create an in-memory repository for testing.
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
        let repo = Self {
            pool,
            revision: Arc::new(revision),
        };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Initialize database schema.
    ///
    /// The `normalized` columns carry the unique constraint used for
    /// duplicate suppression.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS blocked_numbers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                phone_number TEXT NOT NULL,
                normalized TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS blocked_prefixes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                prefix TEXT NOT NULL,
                normalized TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS blocked_contacts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                contact_name TEXT,
                phone_number TEXT NOT NULL,
                normalized TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Subscribe to rule changes.
    ///
    /// The receiver observes a revision counter that advances after every
    /// mutation that changed at least one row.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn notify(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    /// Block an exact phone number.
    ///
    /// Returns `false` without touching the store if the input is blank or a
    /// number with the same normalized form is already blocked.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn add_number(&self, number: &str) -> Result<bool> {
        let number = number.trim();
        if number.is_empty() {
            return Ok(false);
        }

        let result = sqlx::query(
            r"
            INSERT OR IGNORE INTO blocked_numbers (phone_number, normalized)
            VALUES (?, ?)
            ",
        )
        .bind(number)
        .bind(normalize(number))
        .execute(&self.pool)
        .await?;

        let added = result.rows_affected() > 0;
        if added {
            debug!(number, "Blocked number added");
            self.notify();
        }
        Ok(added)
    }

    /// Block a number prefix.
    ///
    /// Same duplicate policy as [`add_number`](Self::add_number).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn add_prefix(&self, prefix: &str) -> Result<bool> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Ok(false);
        }

        let result = sqlx::query(
            r"
            INSERT OR IGNORE INTO blocked_prefixes (prefix, normalized)
            VALUES (?, ?)
            ",
        )
        .bind(prefix)
        .bind(normalize(prefix))
        .execute(&self.pool)
        .await?;

        let added = result.rows_affected() > 0;
        if added {
            debug!(prefix, "Blocked prefix added");
            self.notify();
        }
        Ok(added)
    }

    /// Block a contact's number, keeping its display name.
    ///
    /// Duplicates are detected on the number alone: a second contact with the
    /// same number is ignored even if the name differs.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn add_contact(&self, name: Option<&str>, number: &str) -> Result<bool> {
        let number = number.trim();
        if number.is_empty() {
            return Ok(false);
        }
        let name = name.map(str::trim).filter(|n| !n.is_empty());

        let result = sqlx::query(
            r"
            INSERT OR IGNORE INTO blocked_contacts (contact_name, phone_number, normalized)
            VALUES (?, ?, ?)
            ",
        )
        .bind(name)
        .bind(number)
        .bind(normalize(number))
        .execute(&self.pool)
        .await?;

        let added = result.rows_affected() > 0;
        if added {
            debug!(number, ?name, "Blocked contact added");
            self.notify();
        }
        Ok(added)
    }

    /// Remove a blocked number. Removing an unknown rule is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn remove_number(&self, rule: &BlockedNumber) -> Result<()> {
        let result = sqlx::query("DELETE FROM blocked_numbers WHERE id = ?")
            .bind(rule.id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            debug!(id = %rule.id, "Blocked number removed");
            self.notify();
        }
        Ok(())
    }

    /// Remove a blocked prefix. Removing an unknown rule is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn remove_prefix(&self, rule: &BlockedPrefix) -> Result<()> {
        let result = sqlx::query("DELETE FROM blocked_prefixes WHERE id = ?")
            .bind(rule.id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            debug!(id = %rule.id, "Blocked prefix removed");
            self.notify();
        }
        Ok(())
    }

    /// Remove a blocked contact. Removing an unknown rule is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn remove_contact(&self, rule: &BlockedContact) -> Result<()> {
        let result = sqlx::query("DELETE FROM blocked_contacts WHERE id = ?")
            .bind(rule.id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            debug!(id = %rule.id, "Blocked contact removed");
            self.notify();
        }
        Ok(())
    }

    /// Delete every rule of every kind in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn clear_all(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM blocked_numbers")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM blocked_prefixes")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM blocked_contacts")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!("All blocking rules cleared");
        self.notify();
        Ok(())
    }

    /// Get all blocked numbers as entered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_numbers(&self) -> Result<Vec<String>> {
        let numbers = sqlx::query_scalar("SELECT phone_number FROM blocked_numbers")
            .fetch_all(&self.pool)
            .await?;
        Ok(numbers)
    }

    /// Get all blocked prefixes as entered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_prefixes(&self) -> Result<Vec<String>> {
        let prefixes = sqlx::query_scalar("SELECT prefix FROM blocked_prefixes")
            .fetch_all(&self.pool)
            .await?;
        Ok(prefixes)
    }

    /// Get the numbers of all blocked contacts as entered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_contact_numbers(&self) -> Result<Vec<String>> {
        let numbers = sqlx::query_scalar("SELECT phone_number FROM blocked_contacts")
            .fetch_all(&self.pool)
            .await?;
        Ok(numbers)
    }

    /// Get all blocked number rules, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all_numbers(&self) -> Result<Vec<BlockedNumber>> {
        let rows = sqlx::query("SELECT id, phone_number FROM blocked_numbers ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| BlockedNumber {
                id: RuleId::new(row.get("id")),
                phone_number: row.get("phone_number"),
            })
            .collect())
    }

    /// Get all blocked prefix rules, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all_prefixes(&self) -> Result<Vec<BlockedPrefix>> {
        let rows = sqlx::query("SELECT id, prefix FROM blocked_prefixes ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| BlockedPrefix {
                id: RuleId::new(row.get("id")),
                prefix: row.get("prefix"),
            })
            .collect())
    }

    /// Get all blocked contacts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all_contacts(&self) -> Result<Vec<BlockedContact>> {
        let rows = sqlx::query(
            "SELECT id, contact_name, phone_number FROM blocked_contacts ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| BlockedContact {
                id: RuleId::new(row.get("id")),
                contact_name: row.get("contact_name"),
                phone_number: row.get("phone_number"),
            })
            .collect())
    }

    /// Read the normalized form of every rule in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn snapshot(&self) -> Result<RuleSnapshot> {
        let mut tx = self.pool.begin().await?;
        let numbers = sqlx::query_scalar("SELECT normalized FROM blocked_numbers")
            .fetch_all(&mut *tx)
            .await?;
        let contact_numbers = sqlx::query_scalar("SELECT normalized FROM blocked_contacts")
            .fetch_all(&mut *tx)
            .await?;
        let prefixes = sqlx::query_scalar("SELECT normalized FROM blocked_prefixes")
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(RuleSnapshot {
            numbers,
            contact_numbers,
            prefixes,
        })
    }

    /// Count rules of each kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn summary(&self) -> Result<RuleSummary> {
        let row = sqlx::query(
            r"
            SELECT
                (SELECT COUNT(*) FROM blocked_numbers) as numbers,
                (SELECT COUNT(*) FROM blocked_prefixes) as prefixes,
                (SELECT COUNT(*) FROM blocked_contacts) as contacts
            ",
        )
        .fetch_one(&self.pool)
        .await?;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(RuleSummary {
            numbers: row.get::<i64, _>("numbers") as u32,
            prefixes: row.get::<i64, _>("prefixes") as u32,
            contacts: row.get::<i64, _>("contacts") as u32,
        })
    }
}
