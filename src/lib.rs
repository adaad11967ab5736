//! appforge - turn an app idea into a deployed application
//!
//! This library drives a linear deployment workflow: an LLM generates
//! single-file application source from a free-text idea, the result is
//! published to a source-hosting repository together with a container build
//! setup, a platform API key is provisioned as a sealed repository secret,
//! and a container deployment is triggered and polled to completion. Every
//! attempt is tracked in an external tabular ledger, with optional fan-out
//! to an automation webhook that produces auxiliary documents.
//!
//! # Core Concepts
//!
//! - **Composer**: builds the LLM request and extracts the generated source
//!   from the fenced code block in the reply
//! - **Publisher**: creates the remote repository and pushes the generated
//!   file set as individual commits
//! - **Orchestrator**: runs the fixed phase sequence (generate, publish,
//!   provision secret, deploy, record) over an explicit
//!   [`DeployContext`](workflow::context::DeployContext)
//!
//! # Example Usage
//!
//! ```ignore
//! use appforge::{AppKind, Composer, GenerationRequest};
//! use appforge::llm::openai::OpenAiClient;
//! use std::sync::Arc;
//!
//! async fn generate(backend: Arc<OpenAiClient>) -> anyhow::Result<()> {
//!     let composer = Composer::new(backend, Default::default());
//!     let request = GenerationRequest::new("a todo list app", AppKind::Streamlit);
//!     let app = composer.generate(&request).await?;
//!     println!("{}", app.source);
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`generate`]: prompt composition, code extraction, dependency inference
//! - [`github`]: repository publishing and secret provisioning
//! - [`heroku`]: platform app creation and release polling
//! - [`ledger`]: deployment record bookkeeping
//! - [`workflow`]: the linear deployment orchestrator

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod generate;
pub mod github;
pub mod heroku;
pub mod ledger;
pub mod llm;
pub mod util;
pub mod webhook;
pub mod workflow;

// Re-export key types for convenient access
pub use config::{ConfigError, ForgeConfig};
pub use error::WorkflowError;
pub use generate::composer::{Composer, GeneratedApp, GenerationRequest};
pub use generate::deps::UnmappedPolicy;
pub use generate::kind::AppKind;
pub use generate::GenerationError;
pub use github::client::{GithubClient, RemoteRepository};
pub use github::{PublishError, SecretError};
pub use heroku::client::{HerokuClient, PlatformApp};
pub use heroku::PlatformError;
pub use ledger::client::AirtableClient;
pub use ledger::record::{DeploymentRecord, Status};
pub use ledger::LedgerError;
pub use llm::backend::{BackendError, ChatBackend};
pub use webhook::{WebhookClient, WebhookError};
pub use workflow::context::{DeployContext, Phase};
pub use workflow::orchestrator::{DeployOrchestrator, DeploymentOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_appforge() {
        assert_eq!(NAME, "appforge");
    }
}
