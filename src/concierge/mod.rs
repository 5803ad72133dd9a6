//! The search flow as a visitor's client runs it.
//!
//! Anonymous callers are gated by the [`QuotaTracker`] and only charged for
//! queries that succeed. Identified callers skip the quota entirely; their
//! answered queries go to [`History`] on a best-effort basis.

use std::sync::Arc;
use tracing::{info, warn};

use crate::history::{History, HistoryEntry};
use crate::quota::QuotaTracker;
use crate::relay::{Answer, Failure, QueryRequest, QueryResult, Relay};

pub struct Concierge {
    relay: Relay,
    quota: QuotaTracker,
    history: Option<Arc<dyn History>>,
}

impl Concierge {
    pub fn new(relay: Relay, quota: QuotaTracker) -> Self {
        Self {
            relay,
            quota,
            history: None,
        }
    }

    pub fn with_history(mut self, history: Arc<dyn History>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn quota(&self) -> &QuotaTracker {
        &self.quota
    }

    pub async fn search(&self, request: &QueryRequest) -> QueryResult {
        if request.is_blank() {
            return Err(Failure::invalid_input());
        }

        match request.caller() {
            None => self.search_as_visitor(request).await,
            Some(caller) => {
                let answer = self.relay.relay(request).await?;
                if let Some(history) = &self.history {
                    persist_history(history.as_ref(), caller, request, &answer).await;
                }
                Ok(answer)
            }
        }
    }

    async fn search_as_visitor(&self, request: &QueryRequest) -> QueryResult {
        if !self.quota.can_proceed() {
            info!(limit = self.quota.limit(), "visitor search limit reached");
            return Err(Failure::limit_exceeded(self.quota.limit()));
        }

        let answer = self.relay.relay(request).await?;

        match self.quota.record_usage() {
            Ok(used) => info!(used, limit = self.quota.limit(), "visitor search counted"),
            Err(e) => warn!(error = %e, "failed to record visitor search"),
        }
        Ok(answer)
    }
}

/// Save an answered query to the caller's history. Failures are logged and
/// otherwise ignored.
pub async fn persist_history(
    history: &dyn History,
    caller: &str,
    request: &QueryRequest,
    answer: &Answer,
) {
    let entry = HistoryEntry::new(caller, &request.text, &answer.text, &answer.provider);
    if let Err(e) = history.record(entry).await {
        warn!(caller, error = %e, "failed to persist search history");
    }
}
