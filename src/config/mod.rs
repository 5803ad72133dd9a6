//! Upstream provider settings and the once-per-process provider choice.
//!
//! Every setting can come from a flag or its environment variable. Whichever
//! credential is present first (primary, then fallback) decides the provider
//! for the lifetime of the process.

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::consts::{
    DEFAULT_FALLBACK_MODEL, DEFAULT_FALLBACK_URL, DEFAULT_MAX_TOKENS, DEFAULT_PRIMARY_MODEL,
    DEFAULT_PRIMARY_URL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS, FALLBACK_PROVIDER,
    PRIMARY_PROVIDER,
};
use crate::provider::Provider;
use crate::provider::chat::{ChatCompletionProvider, ChatProviderConfig};

#[derive(Clone, Args)]
pub struct ProviderArgs {
    /// API key for the primary provider
    #[arg(long, global = true, env = "GROQ_API_KEY", hide_env_values = true)]
    pub primary_key: Option<String>,

    /// Base URL of the primary provider's OpenAI-compatible API
    #[arg(long, global = true, env = "CONCIERGE_PRIMARY_URL", default_value = DEFAULT_PRIMARY_URL)]
    pub primary_url: String,

    /// Model requested from the primary provider
    #[arg(long, global = true, env = "CONCIERGE_PRIMARY_MODEL", default_value = DEFAULT_PRIMARY_MODEL)]
    pub primary_model: String,

    /// API key for the fallback provider, used only when no primary key is set
    #[arg(long, global = true, env = "LOVABLE_API_KEY", hide_env_values = true)]
    pub fallback_key: Option<String>,

    /// Base URL of the fallback provider's OpenAI-compatible API
    #[arg(long, global = true, env = "CONCIERGE_FALLBACK_URL", default_value = DEFAULT_FALLBACK_URL)]
    pub fallback_url: String,

    /// Model requested from the fallback provider
    #[arg(long, global = true, env = "CONCIERGE_FALLBACK_MODEL", default_value = DEFAULT_FALLBACK_MODEL)]
    pub fallback_model: String,

    /// Sampling temperature
    #[arg(long, global = true, env = "CONCIERGE_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// Upper bound on generated tokens
    #[arg(long, global = true, env = "CONCIERGE_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    /// Upstream request timeout in seconds
    #[arg(long, global = true, env = "CONCIERGE_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

impl ProviderArgs {
    /// Settings for the primary provider, if its key is set.
    pub fn primary(&self) -> Option<ChatProviderConfig> {
        self.provider_config(
            PRIMARY_PROVIDER,
            self.primary_key.as_deref(),
            &self.primary_url,
            &self.primary_model,
        )
    }

    /// Settings for the fallback provider, if its key is set.
    pub fn fallback(&self) -> Option<ChatProviderConfig> {
        self.provider_config(
            FALLBACK_PROVIDER,
            self.fallback_key.as_deref(),
            &self.fallback_url,
            &self.fallback_model,
        )
    }

    /// Pick the provider to use: primary if configured, else fallback, else none.
    pub fn select(&self) -> Result<Option<Arc<dyn Provider>>> {
        let Some(config) = self.primary().or_else(|| self.fallback()) else {
            warn!("no AI provider key configured, searches will fail");
            return Ok(None);
        };

        info!(provider = %config.name, model = %config.model, url = %config.base_url, "using AI provider");
        let provider = ChatCompletionProvider::new(config).context("failed to build HTTP client")?;
        Ok(Some(Arc::new(provider)))
    }

    fn provider_config(
        &self,
        name: &str,
        key: Option<&str>,
        url: &str,
        model: &str,
    ) -> Option<ChatProviderConfig> {
        let key = key.map(str::trim).filter(|k| !k.is_empty())?;
        Some(ChatProviderConfig {
            name: name.to_string(),
            base_url: url.to_string(),
            model: model.to_string(),
            api_key: key.to_string(),
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            timeout: Duration::from_secs(self.timeout),
        })
    }
}
