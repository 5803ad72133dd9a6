//! Forwards a visitor query to the configured upstream provider.
//!
//! The provider is chosen once, when the relay is built. A relay call makes
//! at most one upstream request and never retries; whether to try again is
//! the caller's decision.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::consts::{EMPTY_COMPLETION_PLACEHOLDER, STUDIO_CONTEXT};
use crate::provider::{Provider, ProviderError};

/// A query as submitted by a caller.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub text: String,
    pub caller_id: Option<String>,
}

impl QueryRequest {
    /// An anonymous query.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            caller_id: None,
        }
    }

    /// A query from an identified caller.
    pub fn for_caller(text: impl Into<String>, caller_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            caller_id: Some(caller_id.into()),
        }
    }

    /// The caller's identity, if one was given. Blank ids count as anonymous.
    pub fn caller(&self) -> Option<&str> {
        self.caller_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A generated answer and the provider that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub provider: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Empty or missing query. Never reaches upstream.
    InvalidInput,
    /// Anonymous caller has used up the free allowance.
    LimitExceeded,
    /// No upstream credential is configured.
    NotConfigured,
    /// Upstream answered 429.
    RateLimited,
    /// Any other upstream failure.
    UpstreamError,
}

/// A failed query, with a message fit to show the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_input() -> Self {
        Self::new(FailureKind::InvalidInput, "Query is required")
    }

    pub fn limit_exceeded(limit: u32) -> Self {
        Self::new(
            FailureKind::LimitExceeded,
            format!(
                "You've used all {limit} free searches for today. Sign in for unlimited searches."
            ),
        )
    }

    pub fn not_configured() -> Self {
        Self::new(FailureKind::NotConfigured, "AI service not configured")
    }

    pub fn rate_limited() -> Self {
        Self::new(
            FailureKind::RateLimited,
            "Rate limit exceeded. Please try again later.",
        )
    }

    pub fn upstream() -> Self {
        Self::new(FailureKind::UpstreamError, "Failed to get AI response")
    }
}

impl From<ProviderError> for Failure {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimited => Failure::rate_limited(),
            ProviderError::Status { .. } | ProviderError::Transport(_) => Failure::upstream(),
        }
    }
}

pub type QueryResult = Result<Answer, Failure>;

/// Stateless pass-through to a single upstream provider.
#[derive(Clone)]
pub struct Relay {
    provider: Option<Arc<dyn Provider>>,
    system_context: String,
}

impl Relay {
    /// Build a relay over `provider`. `None` yields a relay that answers every
    /// valid query with [`FailureKind::NotConfigured`].
    pub fn new(provider: Option<Arc<dyn Provider>>) -> Self {
        Self {
            provider,
            system_context: STUDIO_CONTEXT.to_string(),
        }
    }

    /// Name of the selected provider, if any.
    pub fn provider_name(&self) -> Option<&str> {
        self.provider.as_deref().map(|p| p.name())
    }

    pub async fn relay(&self, request: &QueryRequest) -> QueryResult {
        if request.is_blank() {
            return Err(Failure::invalid_input());
        }

        let Some(provider) = self.provider.as_ref() else {
            warn!("no AI provider configured");
            return Err(Failure::not_configured());
        };

        info!(
            provider = provider.name(),
            caller = request.caller().unwrap_or("visitor"),
            "processing search query"
        );

        let text = match provider.complete(&self.system_context, &request.text).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                warn!(provider = provider.name(), "upstream returned no text");
                EMPTY_COMPLETION_PLACEHOLDER.to_string()
            }
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "relay failed");
                return Err(e.into());
            }
        };

        info!(provider = provider.name(), "AI response generated");
        Ok(Answer {
            text,
            provider: provider.name().to_string(),
        })
    }
}
