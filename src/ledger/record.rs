//! Ledger row types

use crate::workflow::context::DeployContext;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deployment status tracked in the ledger
///
/// Transitions only move forward; a finished deployment is never marked
/// in-progress again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl Status {
    /// Whether moving to `next` is a legal forward transition
    pub fn can_advance_to(self, next: Status) -> bool {
        matches!((self, next), (Status::InProgress, Status::Done))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::InProgress => write!(f, "In Progress"),
            Status::Done => write!(f, "Done"),
        }
    }
}

/// One row per deployment attempt, keyed by the minted identifier
///
/// The identifier is the sole join key between the ledger, the session, and
/// the webhook payload. The artifact URL fields are filled in out-of-band
/// by the auxiliary automation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentRecord {
    #[serde(rename = "unique_id", default)]
    pub unique_id: String,

    #[serde(rename = "app_prompt", default)]
    pub prompt: String,

    #[serde(rename = "repo_name", default)]
    pub repo_name: String,

    #[serde(rename = "Status", default)]
    pub status: Status,

    #[serde(rename = "pitch_deck", default)]
    pub pitch_deck: bool,

    #[serde(rename = "document", default)]
    pub document: bool,

    #[serde(rename = "created_time", default)]
    pub created_time: String,

    #[serde(rename = "pitch_deck_url", default, skip_serializing_if = "Option::is_none")]
    pub pitch_deck_url: Option<String>,

    #[serde(rename = "document_url", default, skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
}

impl DeploymentRecord {
    /// Builds the initial in-progress row for a deployment attempt
    pub fn for_context(ctx: &DeployContext, repo_name: &str) -> Self {
        Self {
            unique_id: ctx.unique_id.clone(),
            prompt: ctx.request.idea.clone(),
            repo_name: repo_name.to_string(),
            status: Status::InProgress,
            pitch_deck: ctx.request.pitch_deck,
            document: ctx.request.document,
            created_time: Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            pitch_deck_url: None,
            document_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_forward_only() {
        assert!(Status::InProgress.can_advance_to(Status::Done));
        assert!(!Status::Done.can_advance_to(Status::InProgress));
        assert!(!Status::Done.can_advance_to(Status::Done));
        assert!(!Status::InProgress.can_advance_to(Status::InProgress));
    }

    #[test]
    fn test_status_serializes_to_ledger_labels() {
        assert_eq!(
            serde_json::to_string(&Status::InProgress).unwrap(),
            "\"In Progress\""
        );
        assert_eq!(serde_json::to_string(&Status::Done).unwrap(), "\"Done\"");
    }

    #[test]
    fn test_record_roundtrip() {
        let record = DeploymentRecord {
            unique_id: "abc-123".to_string(),
            prompt: "a todo app".to_string(),
            repo_name: "demo-app".to_string(),
            status: Status::InProgress,
            pitch_deck: true,
            document: false,
            created_time: "2024-05-01T12:00:00".to_string(),
            pitch_deck_url: None,
            document_url: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["unique_id"], "abc-123");
        assert_eq!(json["Status"], "In Progress");
        assert!(json.get("pitch_deck_url").is_none());

        let back: DeploymentRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.unique_id, "abc-123");
        assert_eq!(back.status, Status::InProgress);
    }

    #[test]
    fn test_sparse_row_deserializes() {
        // Rows written by older revisions may miss fields entirely
        let back: DeploymentRecord =
            serde_json::from_str(r#"{"unique_id": "x"}"#).unwrap();
        assert_eq!(back.unique_id, "x");
        assert_eq!(back.status, Status::InProgress);
        assert!(back.pitch_deck_url.is_none());
    }
}
