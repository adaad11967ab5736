//! Linear deployment orchestration
//!
//! Runs the fixed phase sequence over a [`DeployContext`]: generate,
//! record, publish, provision secret, deploy, mark done, and optionally
//! fan out to the auxiliary automation. Any error aborts forward progress;
//! remote side effects already committed stay in place.

use crate::error::WorkflowError;
use crate::generate::composer::{Composer, GenerationRequest};
use crate::generate::templates::{ci_workflow, generated_files, DEFAULT_BRANCH, WORKFLOW_FILE, WORKFLOW_PATH};
use crate::github::client::GithubClient;
use crate::github::secrets::seal_secret;
use crate::heroku::client::{derive_app_name, HerokuClient};
use crate::ledger::client::AirtableClient;
use crate::ledger::record::{DeploymentRecord, Status};
use crate::webhook::{AuxPayload, WebhookClient};
use crate::workflow::context::{DeployContext, Phase};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Name under which the platform API key is stored as a repository secret
pub const PLATFORM_SECRET_NAME: &str = "HEROKU_API_KEY";

/// Tunables for the deployment phase
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Default repository name when the request carries none
    pub default_repo_name: String,

    /// Plaintext platform API key, sealed into the repository
    pub platform_api_key: String,

    /// Total budget for release-status polling
    pub deploy_timeout: Duration,

    /// Interval between release-status polls
    pub deploy_poll_interval: Duration,
}

/// Result of a completed deployment attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentOutcome {
    pub unique_id: String,
    pub repository: String,
    pub app_name: String,
    pub app_url: String,
    pub release_version: i64,
    pub aux_triggered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aux_error: Option<String>,
    pub elapsed_secs: u64,
}

/// Drives the linear workflow across the service clients
pub struct DeployOrchestrator {
    composer: Composer,
    github: GithubClient,
    heroku: HerokuClient,
    ledger: AirtableClient,
    webhook: Option<WebhookClient>,
    settings: OrchestratorSettings,
}

impl DeployOrchestrator {
    pub fn new(
        composer: Composer,
        github: GithubClient,
        heroku: HerokuClient,
        ledger: AirtableClient,
        webhook: Option<WebhookClient>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            composer,
            github,
            heroku,
            ledger,
            webhook,
            settings,
        }
    }

    /// Runs one deployment attempt end to end
    ///
    /// # Errors
    ///
    /// Returns the first step's `WorkflowError`; later steps do not run.
    /// A failed auxiliary trigger is reported in the outcome instead of
    /// failing the attempt.
    pub async fn execute(
        &self,
        request: GenerationRequest,
    ) -> Result<DeploymentOutcome, WorkflowError> {
        let start = Instant::now();
        let mut ctx = DeployContext::new(request);
        info!("Starting deployment attempt {}", ctx.unique_id);

        // Generate
        ctx.advance(Phase::Generating);
        let app = self.composer.generate(&ctx.request).await?;
        ctx.app = Some(app.clone());
        ctx.advance(Phase::Generated);

        // Record the attempt before touching any remote repository
        let desired_name = ctx
            .request
            .repo_name
            .clone()
            .unwrap_or_else(|| self.settings.default_repo_name.clone());
        let record = DeploymentRecord::for_context(&ctx, &desired_name);
        self.ledger.insert(&record).await?;

        // Publish
        ctx.advance(Phase::Publishing);
        let owner = self.github.authenticated_user().await?;
        let repo_name = self.github.resolve_repo_name(&owner, &desired_name).await?;
        let repo = self.github.create_repo(&repo_name).await?;

        for file in generated_files(&app) {
            self.github
                .create_file(&repo, &file.path, &file.content, &file.message)
                .await?;
        }
        info!("Pushed generated file set to {}", repo.full_name());

        // Provision the platform secret
        ctx.advance(Phase::ProvisioningSecret);
        let public_key = self.github.fetch_secret_public_key(&repo).await?;
        let sealed = seal_secret(&public_key, &self.settings.platform_api_key)?;
        self.github
            .put_repo_secret(&repo, PLATFORM_SECRET_NAME, &sealed)
            .await?;

        // Deploy
        ctx.advance(Phase::Deploying);
        let app_name = derive_app_name(&repo.name);
        let platform_app = self.heroku.create_app(&app_name).await?;

        let baseline = self
            .heroku
            .latest_release(&platform_app.name)
            .await?
            .map(|(version, _)| version)
            .unwrap_or(0);

        self.github
            .create_file(
                &repo,
                WORKFLOW_PATH,
                &ci_workflow(&platform_app.name),
                "add deploy workflow",
            )
            .await?;
        self.github
            .dispatch_workflow(&repo, WORKFLOW_FILE, DEFAULT_BRANCH)
            .await?;

        let release_version = self
            .heroku
            .wait_for_release(
                &platform_app.name,
                baseline,
                self.settings.deploy_timeout,
                self.settings.deploy_poll_interval,
            )
            .await?;
        let repository = repo.full_name();
        ctx.repository = Some(repo);
        ctx.platform_app = Some(platform_app.clone());
        ctx.advance(Phase::Deployed);

        // Mark the attempt done
        self.ledger
            .update_status(&ctx.unique_id, Status::Done)
            .await?;

        // Optional fan-out; failure is reported, never fatal
        let (aux_triggered, aux_error) = self.trigger_aux(&ctx).await;

        info!(
            "Deployment {} complete: {} in {:.0}s",
            ctx.unique_id,
            platform_app.web_url,
            start.elapsed().as_secs_f64()
        );

        Ok(DeploymentOutcome {
            unique_id: ctx.unique_id,
            repository,
            app_name: platform_app.name,
            app_url: platform_app.web_url,
            release_version,
            aux_triggered,
            aux_error,
            elapsed_secs: start.elapsed().as_secs(),
        })
    }

    async fn trigger_aux(&self, ctx: &DeployContext) -> (bool, Option<String>) {
        if !ctx.request.pitch_deck && !ctx.request.document {
            return (false, None);
        }

        let Some(webhook) = &self.webhook else {
            warn!("Auxiliary documents requested but no webhook URL is configured");
            return (false, Some("webhook URL not configured".to_string()));
        };

        let payload = AuxPayload {
            unique_id: ctx.unique_id.clone(),
            app_prompt: ctx.request.idea.clone(),
            pitch_deck: ctx.request.pitch_deck,
            document: ctx.request.document,
        };

        match webhook.trigger(&payload).await {
            Ok(()) => (true, None),
            Err(e) => {
                warn!("Auxiliary trigger failed: {}", e);
                (true, Some(e.to_string()))
            }
        }
    }
}
