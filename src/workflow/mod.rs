//! The linear deployment workflow

pub mod context;
pub mod orchestrator;

pub use context::{DeployContext, Phase};
pub use orchestrator::{DeployOrchestrator, DeploymentOutcome, OrchestratorSettings};
