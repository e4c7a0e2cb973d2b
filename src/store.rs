//! SQLite persistence for news items.
//!
//! One [`NewsStore`] is opened per run and is the only writer — the pool is
//! capped at a single connection. The store owns the dedup/freshness gate
//! ([`NewsStore::admit`]) and the transactional read/update pair the
//! delivery queue runs on.

use std::error::Error;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Row, Sqlite, Transaction};
use tracing::{info, instrument};

use crate::models::{NewsItem, QueuedItem};
use crate::timefmt;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS news_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT,
    category TEXT,
    posted TEXT,
    title TEXT,
    image TEXT,
    text TEXT,
    p1 TEXT,
    item_was_sent BOOLEAN
);
"#;

/// Outcome of offering one article to the dedup/freshness gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// New and fresh; the row was inserted with `item_was_sent = false`.
    Inserted,
    /// A row with the same URL already exists; nothing was written.
    Duplicate,
    /// New but older than the recency window; never inserted, never
    /// retried.
    Stale,
}

/// Handle to the `news_items` table.
pub struct NewsStore {
    pool: SqlitePool,
}

impl NewsStore {
    /// Open (and create if missing) the database at `db_path`.
    ///
    /// `bootstrap_schema` creates the `news_items` table; dry runs pass
    /// `false` so a rehearsal leaves no schema behind. Open failure is the
    /// one error the caller treats as fatal — nothing can proceed without a
    /// store.
    #[instrument(level = "info", skip_all, fields(db_path = %db_path))]
    pub async fn open(db_path: &str, bootstrap_schema: bool) -> Result<Self, Box<dyn Error>> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        // Single-writer discipline: one connection, one process per run.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        if bootstrap_schema {
            sqlx::query(SCHEMA_SQL).execute(&store.pool).await?;
            info!("Database setup completed");
        }
        Ok(store)
    }

    /// Offer one article to the dedup/freshness gate.
    ///
    /// Looks up the URL first: an existing row short-circuits to
    /// [`Admission::Duplicate`], so calling twice with the same URL never
    /// double-inserts. A new article is admitted only when its age at
    /// `now` is within `window_days` — exactly at the boundary still
    /// counts as fresh. The count-then-insert pair is not atomic against
    /// other processes; this store assumes a single writer.
    pub async fn admit(
        &self,
        item: &NewsItem,
        now: NaiveDateTime,
        window_days: i64,
    ) -> Result<Admission, Box<dyn Error>> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM news_items WHERE url = ?")
            .bind(&item.url)
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(Admission::Duplicate);
        }

        let posted = timefmt::parse_canonical(&item.posted)
            .ok_or_else(|| format!("unparsable posted timestamp: '{}'", item.posted))?;
        let age = now.signed_duration_since(posted);
        if age.num_seconds() > window_days * 86_400 {
            return Ok(Admission::Stale);
        }

        let text_json = serde_json::to_string(&item.paragraphs)?;
        sqlx::query(
            r#"
            INSERT INTO news_items (url, category, posted, title, image, text, p1, item_was_sent)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.url)
        .bind(&item.category)
        .bind(&item.posted)
        .bind(&item.title)
        .bind(&item.image)
        .bind(&text_json)
        .bind(&item.excerpt)
        .bind(false)
        .execute(&self.pool)
        .await?;

        Ok(Admission::Inserted)
    }

    /// Begin the transaction the delivery queue runs inside.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Read every unsent row, projected to the delivery-relevant fields,
    /// in storage order.
    pub async fn select_unsent(
        tx: &mut Transaction<'_, Sqlite>,
    ) -> Result<Vec<QueuedItem>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, category, posted, title, image, p1 FROM news_items WHERE item_was_sent = 0",
        )
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| QueuedItem {
                id: row.get("id"),
                category: row.get("category"),
                posted: row.get("posted"),
                title: row.get("title"),
                image: row.get("image"),
                excerpt: row.get("p1"),
            })
            .collect())
    }

    /// Flip one row to sent inside the delivery transaction. The flag only
    /// ever moves false→true, and only after a confirmed send.
    pub async fn mark_sent(
        tx: &mut Transaction<'_, Sqlite>,
        id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE news_items SET item_was_sent = 1 WHERE id = ?")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    #[cfg(test)]
    pub async fn open_in_memory() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::query(SCHEMA_SQL).execute(&pool).await.unwrap();
        Self { pool }
    }

    #[cfg(test)]
    pub async fn insert_unsent(&self, url: &str, posted: &str, image: &str) -> i64 {
        let result = sqlx::query(
            r#"
            INSERT INTO news_items (url, category, posted, title, image, text, p1, item_was_sent)
            VALUES (?, 'Cat', ?, 'Title', ?, '["Body."]', 'Excerpt', 0)
            "#,
        )
        .bind(url)
        .bind(posted)
        .bind(image)
        .execute(&self.pool)
        .await
        .unwrap();
        result.last_insert_rowid()
    }

    #[cfg(test)]
    pub async fn row_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM news_items")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    #[cfg(test)]
    pub async fn sent_ids(&self) -> Vec<i64> {
        sqlx::query_scalar("SELECT id FROM news_items WHERE item_was_sent = 1 ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .unwrap()
    }
}
