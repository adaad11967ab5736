//! Fire-and-forget trigger for the auxiliary-material automation
//!
//! Success is judged solely by HTTP status. The automation's eventual
//! output (artifact URLs) appears in the ledger row out-of-band.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors from the auxiliary trigger
///
/// A failed trigger never alters the ledger's deployment status.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The automation endpoint returned a non-success status
    #[error("webhook rejected the payload (HTTP {status})")]
    Rejected { status: u16 },

    /// Network-related error
    #[error("webhook request failed: {0}")]
    Network(String),
}

/// Payload selecting which auxiliary documents to produce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuxPayload {
    pub unique_id: String,
    pub app_prompt: String,
    pub pitch_deck: bool,
    pub document: bool,
}

/// Client for the externally configured automation webhook
pub struct WebhookClient {
    url: String,
    http: Client,
}

impl WebhookClient {
    pub fn new(url: String) -> Self {
        Self::with_timeout(url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(url: String, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("appforge/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");

        Self { url, http }
    }

    /// Posts the payload; no acknowledgment beyond HTTP status
    pub async fn trigger(&self, payload: &AuxPayload) -> Result<(), WebhookError> {
        let response = self
            .http
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| WebhookError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WebhookError::Rejected {
                status: status.as_u16(),
            });
        }

        info!(
            "Triggered auxiliary automation for {} (pitch_deck={}, document={})",
            payload.unique_id, payload.pitch_deck, payload.document
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let payload = AuxPayload {
            unique_id: "abc".to_string(),
            app_prompt: "a todo app".to_string(),
            pitch_deck: true,
            document: false,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["unique_id"], "abc");
        assert_eq!(json["pitch_deck"], true);
        assert_eq!(json["document"], false);
    }
}
