//! Chat-completion backend abstraction
//!
//! All backends implement the [`ChatBackend`] trait: one system prompt, one
//! user prompt, one textual reply. There is no streaming and no retry; the
//! workflow issues exactly one request per user action.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during backend operations
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// API request failed with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Request timed out after the specified duration (in seconds)
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Network-related error
    #[error("Network error: {0}")]
    Network(String),

    /// The reply body could not be interpreted
    #[error("Invalid response from LLM: {0}")]
    InvalidResponse(String),

    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Core trait all chat-completion backends implement
///
/// # Example
///
/// ```ignore
/// use appforge::llm::ChatBackend;
///
/// async fn ask(backend: &dyn ChatBackend) -> Result<String, Box<dyn std::error::Error>> {
///     let reply = backend
///         .complete("You are a helpful assistant.", "Say hello.")
///         .await?;
///     Ok(reply)
/// }
/// ```
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Sends one chat-completion request and returns the raw reply text
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the call fails, times out, or the response
    /// carries no content.
    async fn complete(&self, system: &str, user: &str) -> Result<String, BackendError>;

    /// Returns the human-readable name of this backend
    fn name(&self) -> &str;

    /// Returns optional model information for this backend
    fn model_info(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = BackendError::Api {
            status: 500,
            message: "upstream broke".to_string(),
        };
        assert!(error.to_string().contains("500"));
        assert!(error.to_string().contains("upstream broke"));
    }

    #[test]
    fn test_timeout_display() {
        let error = BackendError::Timeout { seconds: 30 };
        assert!(error.to_string().contains("30 seconds"));
    }
}
