//! Free-query allowance for anonymous callers.
//!
//! The tracker keeps one [`QuotaRecord`] under a single store key and expires
//! it lazily: there is no timer, a read that finds a window older than
//! [`QUOTA_WINDOW_HOURS`] resets the record in place. Reads never fail; a
//! record that cannot be loaded counts as absent.
//!
//! Check-then-increment is not atomic. Two requests racing from the same
//! caller can both pass [`QuotaTracker::can_proceed`] before either calls
//! [`QuotaTracker::record_usage`], over-counting by at most one per racer.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::consts::{DEFAULT_SEARCH_LIMIT, QUOTA_STORAGE_KEY, QUOTA_WINDOW_HOURS};
use crate::store::KeyValueStore;

/// Source of "now". Swappable so tests can move time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// One caller's usage within the current window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRecord {
    pub count: u32,
    #[serde(rename = "lastReset")]
    pub window_start: DateTime<Utc>,
}

impl QuotaRecord {
    fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            window_start: now,
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.window_start >= Duration::hours(QUOTA_WINDOW_HOURS)
    }
}

pub struct QuotaTracker {
    store: Arc<dyn KeyValueStore>,
    limit: u32,
    clock: Clock,
}

impl QuotaTracker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_limit(store, DEFAULT_SEARCH_LIMIT)
    }

    pub fn with_limit(store: Arc<dyn KeyValueStore>, limit: u32) -> Self {
        Self {
            store,
            limit,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Queries consumed in the current window. Resets an expired record as a
    /// side effect.
    pub fn used_count(&self) -> u32 {
        self.current().map(|record| record.count).unwrap_or(0)
    }

    /// Queries left before the caller is turned away.
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used_count())
    }

    pub fn can_proceed(&self) -> bool {
        self.used_count() < self.limit
    }

    /// Count one successful query. Returns the new used count.
    pub fn record_usage(&self) -> Result<u32> {
        let now = (self.clock)();
        let mut record = self.current().unwrap_or_else(|| QuotaRecord::fresh(now));
        record.count = record.count.saturating_add(1);
        self.save(&record).context("failed to persist quota record")?;
        debug!(count = record.count, limit = self.limit, "recorded visitor search");
        Ok(record.count)
    }

    /// The stored record with expiry applied, or `None` if nothing usable is
    /// stored.
    fn current(&self) -> Option<QuotaRecord> {
        let record = self.load()?;
        let now = (self.clock)();
        if !record.is_expired(now) {
            return Some(record);
        }

        let fresh = QuotaRecord::fresh(now);
        if let Err(e) = self.save(&fresh) {
            warn!(error = %e, "failed to reset expired quota record");
        }
        debug!("quota window expired, counter reset");
        Some(fresh)
    }

    fn load(&self) -> Option<QuotaRecord> {
        let raw = match self.store.get(QUOTA_STORAGE_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "failed to read quota record, treating as empty");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "unreadable quota record, treating as empty");
                None
            }
        }
    }

    fn save(&self, record: &QuotaRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        self.store.set(QUOTA_STORAGE_KEY, &json)
    }
}
