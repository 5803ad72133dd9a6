pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One answered query from an identified caller.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub user_id: String,
    pub query: String,
    pub response: String,
    pub provider: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(user_id: &str, query: &str, response: &str, provider: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            query: query.to_string(),
            response: response.to_string(),
            provider: provider.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Where identified callers' searches are kept.
#[async_trait]
pub trait History: Send + Sync {
    async fn record(&self, entry: HistoryEntry) -> Result<()>;

    /// The user's last `limit` entries, oldest first.
    async fn for_user(&self, user_id: &str, limit: usize) -> Result<Vec<HistoryEntry>>;

    async fn clear_user(&self, user_id: &str) -> Result<()>;
}
