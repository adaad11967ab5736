//! Explicit per-attempt workflow state
//!
//! All state a deployment attempt accumulates lives in [`DeployContext`],
//! which each step receives and enriches. There is no ambient session
//! storage.

use crate::generate::composer::{GeneratedApp, GenerationRequest};
use crate::github::client::RemoteRepository;
use crate::heroku::client::PlatformApp;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Workflow phases, in order; transitions only move forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Idle,
    Generating,
    Generated,
    Publishing,
    ProvisioningSecret,
    Deploying,
    Deployed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Generating => "generating",
            Phase::Generated => "generated",
            Phase::Publishing => "publishing",
            Phase::ProvisioningSecret => "secret-provisioning",
            Phase::Deploying => "deploying",
            Phase::Deployed => "deployed",
        };
        write!(f, "{}", name)
    }
}

/// State threaded through one deployment attempt
#[derive(Debug)]
pub struct DeployContext {
    /// The originating request
    pub request: GenerationRequest,

    /// Identifier minted at generation time; the sole join key between the
    /// ledger, the session, and the webhook payload
    pub unique_id: String,

    /// Current phase
    pub phase: Phase,

    /// Set once generation completes
    pub app: Option<GeneratedApp>,

    /// Set once the repository is created
    pub repository: Option<RemoteRepository>,

    /// Set once the platform app is created
    pub platform_app: Option<PlatformApp>,
}

impl DeployContext {
    /// Starts a fresh attempt and mints its identifier
    pub fn new(request: GenerationRequest) -> Self {
        Self {
            request,
            unique_id: Uuid::new_v4().to_string(),
            phase: Phase::Idle,
            app: None,
            repository: None,
            platform_app: None,
        }
    }

    /// Moves to the next phase; backward moves are refused
    pub fn advance(&mut self, next: Phase) {
        if next <= self.phase {
            warn!(
                "Refusing backward phase transition {} -> {}",
                self.phase, next
            );
            return;
        }
        debug!("Phase: {} -> {}", self.phase, next);
        self.phase = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::kind::AppKind;

    #[test]
    fn test_new_context_mints_identifier() {
        let a = DeployContext::new(GenerationRequest::new("idea", AppKind::Streamlit));
        let b = DeployContext::new(GenerationRequest::new("idea", AppKind::Streamlit));

        assert_eq!(a.phase, Phase::Idle);
        assert!(!a.unique_id.is_empty());
        assert_ne!(a.unique_id, b.unique_id);
    }

    #[test]
    fn test_advance_is_forward_only() {
        let mut ctx = DeployContext::new(GenerationRequest::new("idea", AppKind::Streamlit));

        ctx.advance(Phase::Generating);
        ctx.advance(Phase::Generated);
        assert_eq!(ctx.phase, Phase::Generated);

        // Backward transition is a no-op
        ctx.advance(Phase::Generating);
        assert_eq!(ctx.phase, Phase::Generated);
    }

    #[test]
    fn test_phase_ordering() {
        assert!(Phase::Idle < Phase::Generating);
        assert!(Phase::Deploying < Phase::Deployed);
    }
}
