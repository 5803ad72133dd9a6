use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Provider, ProviderError};

/// What a [`MockProvider`] answers with on a given call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Empty,
    RateLimited,
    Status(u16),
}

impl MockReply {
    fn into_result(self) -> Result<Option<String>, ProviderError> {
        match self {
            MockReply::Text(text) => Ok(Some(text)),
            MockReply::Empty => Ok(None),
            MockReply::RateLimited => Err(ProviderError::RateLimited),
            MockReply::Status(status) => Err(ProviderError::Status {
                status,
                body: "mock failure".to_string(),
            }),
        }
    }
}

/// A scripted provider for tests. Replays `replies` in order and repeats the
/// last one once the script runs out.
pub struct MockProvider {
    name: String,
    replies: Vec<MockReply>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(name: &str, replies: Vec<MockReply>) -> Self {
        Self {
            name: name.to_string(),
            replies,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `text`.
    pub fn answering(name: &str, text: &str) -> Self {
        Self::new(name, vec![MockReply::Text(text.to_string())])
    }

    /// Number of completions requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// User prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, _system: &str, prompt: &str) -> Result<Option<String>, ProviderError> {
        let i = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self
            .replies
            .get(i)
            .or_else(|| self.replies.last())
            .cloned()
            .unwrap_or(MockReply::Empty);
        reply.into_result()
    }
}
