//! OpenAI-compatible chat-completion client
//!
//! Speaks the `/v1/chat/completions` JSON shape, which also covers local
//! services exposing an OpenAI-compatible endpoint.

use crate::llm::backend::{BackendError, ChatBackend};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Default request timeout for API calls
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Upper bound for generated application source
const MAX_COMPLETION_TOKENS: u32 = 4096;

/// Chat-completion client for OpenAI-compatible endpoints
///
/// # Thread Safety
///
/// This client is thread-safe and can be shared across tasks using `Arc`.
pub struct OpenAiClient {
    /// API endpoint URL
    endpoint: String,

    /// Model name to use for generation
    model: String,

    /// Bearer token
    api_key: String,

    /// Shared HTTP client with connection pooling
    http_client: Client,

    /// Request timeout duration
    timeout: Duration,
}

impl OpenAiClient {
    /// Creates a new client with the default timeout
    pub fn new(endpoint: String, model: String, api_key: String) -> Self {
        Self::with_timeout(
            endpoint,
            model,
            api_key,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Creates a new client with a custom timeout
    pub fn with_timeout(
        endpoint: String,
        model: String,
        api_key: String,
        timeout: Duration,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            endpoint,
            model,
            api_key,
            http_client,
            timeout,
        }
    }

    /// Checks whether the completion service is reachable
    ///
    /// Makes a lightweight request to `/v1/models`. Returns `Ok(false)` for
    /// unreachable or unhealthy services rather than an error, so health
    /// reporting can distinguish "down" from "broken".
    pub async fn health_check(&self) -> Result<bool, BackendError> {
        let url = format!("{}/v1/models", self.endpoint);

        debug!("Checking LLM service health at {}", url);

        match self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
        {
            Ok(response) => {
                let is_healthy = response.status().is_success();
                if is_healthy {
                    info!("LLM service health check successful");
                } else {
                    warn!(
                        "LLM service health check failed with status: {}",
                        response.status()
                    );
                }
                Ok(is_healthy)
            }
            Err(e) => {
                if e.is_timeout() || e.is_connect() {
                    warn!("Cannot reach LLM service at {}", self.endpoint);
                    Ok(false)
                } else {
                    error!("LLM service health check error: {}", e);
                    Err(BackendError::Network(format!("Health check failed: {}", e)))
                }
            }
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, BackendError> {
        let url = format!("{}/v1/chat/completions", self.endpoint);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: Some(0.2),
            max_tokens: Some(MAX_COMPLETION_TOKENS),
            stream: Some(false),
        };

        debug!(
            "Sending completion request: prompt_length={}",
            request.messages[1].content.len()
        );

        let start = Instant::now();

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!("LLM request timed out after {:?}", self.timeout);
                    BackendError::Timeout {
                        seconds: self.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    error!("Cannot connect to LLM service at {}", self.endpoint);
                    BackendError::Network(format!("Connection failed: {}", e))
                } else {
                    error!("LLM request error: {}", e);
                    BackendError::Network(format!("Request failed: {}", e))
                }
            })?;

        let elapsed = start.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            error!("LLM API returned error status {}: {}", status, body);

            return Err(BackendError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let api_response: ChatResponse = response.json().await.map_err(|e| {
            error!("Failed to parse LLM response: {}", e);
            BackendError::InvalidResponse(format!("JSON parse error: {}", e))
        })?;

        info!("Completion finished in {:.2}s", elapsed.as_secs_f64());

        debug!(
            "Token usage: prompt={}, completion={}",
            api_response
                .usage
                .as_ref()
                .map(|u| u.prompt_tokens)
                .unwrap_or(0),
            api_response
                .usage
                .as_ref()
                .map(|u| u.completion_tokens)
                .unwrap_or(0),
        );

        let content = api_response
            .choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .map(|message| message.content.clone())
            .ok_or_else(|| {
                BackendError::InvalidResponse("No content in completion response".to_string())
            })?;

        Ok(content)
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model_info(&self) -> Option<String> {
        Some(format!("{} @ {}", self.model, self.endpoint))
    }
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Message structure for the chat-completions API
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

/// Request structure for the chat-completions API
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Response structure from the chat-completions API
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatResponse {
    id: Option<String>,
    model: Option<String>,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Choice {
    index: Option<u32>,
    finish_reason: Option<String>,
    message: Option<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OpenAiClient::new(
            "https://api.openai.com".to_string(),
            "gpt-4".to_string(),
            "sk-test".to_string(),
        );
        assert_eq!(client.name(), "openai");
        assert!(client.model_info().unwrap().contains("gpt-4"));
    }

    #[test]
    fn test_client_with_custom_timeout() {
        let timeout = Duration::from_secs(120);
        let client = OpenAiClient::with_timeout(
            "https://api.openai.com".to_string(),
            "gpt-4".to_string(),
            "sk-test".to_string(),
            timeout,
        );
        assert_eq!(client.timeout, timeout);
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "test-model".to_string(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: "You are helpful.".to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: "Hello".to_string(),
                },
            ],
            temperature: Some(0.2),
            max_tokens: Some(4096),
            stream: Some(false),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"role\":\"system\""));
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("\"temperature\":0.2"));
    }

    #[test]
    fn test_response_parsing() {
        let response_json = r#"{
            "id": "test-id",
            "model": "test-model",
            "choices": [{
                "index": 0,
                "finish_reason": "stop",
                "message": {
                    "role": "assistant",
                    "content": "Test response"
                }
            }],
            "usage": {
                "prompt_tokens": 10,
                "completion_tokens": 5,
                "total_tokens": 15
            }
        }"#;

        let response: ChatResponse = serde_json::from_str(response_json).unwrap();
        assert_eq!(response.choices.len(), 1);
        assert_eq!(
            response.choices[0].message.as_ref().unwrap().content,
            "Test response"
        );
        assert_eq!(response.usage.unwrap().prompt_tokens, 10);
    }

    #[test]
    fn test_debug_impl_hides_key() {
        let client = OpenAiClient::new(
            "https://api.openai.com".to_string(),
            "gpt-4".to_string(),
            "sk-secret".to_string(),
        );
        let debug_str = format!("{:?}", client);
        assert!(debug_str.contains("OpenAiClient"));
        assert!(!debug_str.contains("sk-secret"));
    }
}
