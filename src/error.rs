//! Top-level workflow error taxonomy
//!
//! Each service module owns its own error enum; this module aggregates them
//! into the single [`WorkflowError`] returned by the deployment orchestrator.
//! The kind identifies the workflow step that failed, letting callers decide
//! abort vs. report per kind instead of matching on message strings.

use thiserror::Error;

pub use crate::generate::GenerationError;
pub use crate::github::{PublishError, SecretError};
pub use crate::heroku::PlatformError;
pub use crate::ledger::LedgerError;
pub use crate::webhook::WebhookError;

/// Aggregated error for the deployment workflow
///
/// Remote side effects committed before the failing step (created repository,
/// uploaded secret, created platform app) are left in place; cleanup is
/// manual.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Webhook(#[from] WebhookError),
}

impl WorkflowError {
    /// Human-readable name of the workflow step this error belongs to
    pub fn step(&self) -> &'static str {
        match self {
            WorkflowError::Generation(_) => "generation",
            WorkflowError::Publish(_) => "publish",
            WorkflowError::Secret(_) => "secret provisioning",
            WorkflowError::Platform(_) => "platform deployment",
            WorkflowError::Ledger(_) => "ledger",
            WorkflowError::Webhook(_) => "auxiliary trigger",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_names() {
        let err = WorkflowError::Platform(PlatformError::CreateRejected {
            status: 422,
            message: "name taken".to_string(),
        });
        assert_eq!(err.step(), "platform deployment");

        let err = WorkflowError::Ledger(LedgerError::RecordNotFound("abc".to_string()));
        assert_eq!(err.step(), "ledger");
    }

    #[test]
    fn test_display_is_transparent() {
        let err = WorkflowError::Webhook(WebhookError::Rejected { status: 500 });
        assert!(err.to_string().contains("500"));
    }
}
