use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use std::sync::Mutex;

use super::{History, HistoryEntry};

/// SQLite-backed search history.
pub struct SqliteHistory {
    conn: Mutex<Connection>,
}

impl SqliteHistory {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open history database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS search_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                query TEXT NOT NULL,
                response TEXT NOT NULL,
                provider TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS search_history_user
                ON search_history (user_id, id);",
        )
        .context("failed to create search_history table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }
}

#[async_trait]
impl History for SqliteHistory {
    async fn record(&self, entry: HistoryEntry) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO search_history (user_id, query, response, provider, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.user_id,
                entry.query,
                entry.response,
                entry.provider,
                entry.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn for_user(&self, user_id: &str, limit: usize) -> Result<Vec<HistoryEntry>> {
        let conn = self.conn.lock().unwrap();
        // Newest `limit` rows, handed back in chronological order
        let mut stmt = conn.prepare(
            "SELECT user_id, query, response, provider, created_at FROM (
                SELECT * FROM search_history WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2
            ) ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![user_id, limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(user_id, query, response, provider, created_at)| -> Result<HistoryEntry> {
                let created_at = DateTime::parse_from_rfc3339(&created_at)
                    .with_context(|| format!("bad timestamp in search_history: {created_at}"))?
                    .with_timezone(&Utc);
                Ok(HistoryEntry {
                    user_id,
                    query,
                    response,
                    provider,
                    created_at,
                })
            })
            .collect()
    }

    async fn clear_user(&self, user_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM search_history WHERE user_id = ?1", [user_id])?;
        Ok(())
    }
}
