use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use super::{Provider, ProviderError};

/// Everything needed to reach one chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct ChatProviderConfig {
    pub name: String,
    /// Base URL without the trailing `/chat/completions`.
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

/// Provider speaking the OpenAI-compatible chat completions protocol.
pub struct ChatCompletionProvider {
    config: ChatProviderConfig,
    endpoint: String,
    client: reqwest::Client,
}

impl ChatCompletionProvider {
    pub fn new(config: ChatProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        Ok(Self {
            config,
            endpoint,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request<'a>(&'a self, system: &'a str, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

#[async_trait]
impl Provider for ChatCompletionProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<Option<String>, ProviderError> {
        let body = self.build_request(system, prompt);

        debug!(provider = %self.config.name, model = %self.config.model, "sending completion request");

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            error!(
                provider = %self.config.name,
                status = status.as_u16(),
                body = %text,
                "upstream returned an error"
            );
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ProviderError::RateLimited);
            }
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let data: ChatResponse = resp.json().await?;
        Ok(data.first_content())
    }
}

// --- API types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

impl ChatResponse {
    /// Content of the first choice, if it has any text.
    fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
    }
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ChatProviderConfig {
        ChatProviderConfig {
            name: "primary".to_string(),
            base_url: "https://api.example.test/v1/".to_string(),
            model: "test-model".to_string(),
            api_key: "sk-test".to_string(),
            temperature: Some(0.7),
            max_tokens: Some(1024),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let provider = ChatCompletionProvider::new(config()).unwrap();
        assert_eq!(
            provider.endpoint(),
            "https://api.example.test/v1/chat/completions"
        );
    }

    #[test]
    fn request_carries_system_then_user() {
        let provider = ChatCompletionProvider::new(config()).unwrap();
        let json = serde_json::to_value(provider.build_request("ctx", "hello")).unwrap();

        assert_eq!(json["model"], "test-model");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "ctx");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert_eq!(json["max_tokens"], 1024);
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn request_omits_unset_sampling_params() {
        let provider = ChatCompletionProvider::new(ChatProviderConfig {
            temperature: None,
            max_tokens: None,
            ..config()
        })
        .unwrap();
        let json = serde_json::to_value(provider.build_request("ctx", "hi")).unwrap();

        assert!(json.get("temperature").is_none());
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn first_content_extracts_text() {
        let resp: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"Kitchens are..."}},{"message":{"content":"ignored"}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.first_content().as_deref(), Some("Kitchens are..."));
    }

    #[test]
    fn first_content_none_when_missing() {
        for raw in [
            r#"{}"#,
            r#"{"choices":[]}"#,
            r#"{"choices":[{}]}"#,
            r#"{"choices":[{"message":{}}]}"#,
            r#"{"choices":[{"message":{"content":"  "}}]}"#,
        ] {
            let resp: ChatResponse = serde_json::from_str(raw).unwrap();
            assert!(resp.first_content().is_none(), "expected none for {raw}");
        }
    }
}
