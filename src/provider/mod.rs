pub mod chat;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Why an upstream call did not produce a completion.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("upstream rate limited the request")]
    RateLimited,

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A text-completion service. One call in, one completion (or nothing) out.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Label reported back to callers, e.g. `"primary"`.
    fn name(&self) -> &str;

    /// Complete `prompt` under the given system context.
    ///
    /// `Ok(None)` means the upstream answered successfully but produced no
    /// text.
    async fn complete(&self, system: &str, prompt: &str) -> Result<Option<String>, ProviderError>;
}
