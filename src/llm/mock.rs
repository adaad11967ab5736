//! Scripted chat backend for tests

use crate::llm::backend::{BackendError, ChatBackend};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A backend that replays scripted replies in order
///
/// Each call to `complete` pops the next scripted item. Running past the end
/// of the script is reported as a configuration error so tests fail loudly.
pub struct MockChatBackend {
    responses: Mutex<VecDeque<Result<String, BackendError>>>,
    name: String,
}

impl MockChatBackend {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            name: "mock".to_string(),
        }
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            name: name.into(),
        }
    }

    /// Queues a successful reply
    pub fn push_reply(&self, content: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(content.into()));
    }

    /// Queues a failure
    pub fn push_error(&self, error: BackendError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Number of scripted items not yet consumed
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

impl Default for MockChatBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatBackend for MockChatBackend {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, BackendError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(BackendError::Configuration(
                    "MockChatBackend ran out of scripted responses".to_string(),
                ))
            })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order() {
        let mock = MockChatBackend::new();
        mock.push_reply("first");
        mock.push_reply("second");

        assert_eq!(mock.complete("s", "u").await.unwrap(), "first");
        assert_eq!(mock.complete("s", "u").await.unwrap(), "second");
        assert_eq!(mock.remaining(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_script_errors() {
        let mock = MockChatBackend::new();
        let result = mock.complete("s", "u").await;
        assert!(matches!(result, Err(BackendError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_scripted_error() {
        let mock = MockChatBackend::new();
        mock.push_error(BackendError::Timeout { seconds: 5 });

        let result = mock.complete("s", "u").await;
        assert!(matches!(result, Err(BackendError::Timeout { seconds: 5 })));
    }
}
