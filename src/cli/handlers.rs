//! Subcommand handlers
//!
//! Each handler builds its clients from configuration, runs the operation,
//! and returns a process exit code. Errors are printed one line per failed
//! step.

use crate::cli::commands::{ArtifactsArgs, DeployArgs, GenerateArgs, HealthArgs};
use crate::cli::output::{HealthStatus, OutputFormatter};
use crate::config::ForgeConfig;
use crate::generate::composer::{Composer, GenerationRequest};
use crate::github::client::GithubClient;
use crate::heroku::client::HerokuClient;
use crate::ledger::client::AirtableClient;
use crate::llm::openai::OpenAiClient;
use crate::webhook::WebhookClient;
use crate::workflow::orchestrator::{DeployOrchestrator, OrchestratorSettings};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

fn load_config() -> Option<ForgeConfig> {
    match ForgeConfig::from_env() {
        Ok(config) => Some(config),
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            None
        }
    }
}

fn spinner(message: &'static str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner());
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn llm_client(config: &ForgeConfig) -> OpenAiClient {
    OpenAiClient::with_timeout(
        config.llm_endpoint.clone(),
        config.llm_model.clone(),
        config.llm_api_key.clone(),
        config.request_timeout(),
    )
}

fn composer(config: &ForgeConfig) -> Composer {
    Composer::new(Arc::new(llm_client(config)), config.unmapped_imports)
}

pub async fn handle_generate(args: &GenerateArgs, quiet: bool) -> i32 {
    let Some(config) = load_config() else {
        return 2;
    };

    let request = GenerationRequest::new(args.idea.clone(), args.kind.into());
    let pb = spinner("Generating code...", quiet);
    let result = composer(&config).generate(&request).await;
    pb.finish_and_clear();

    let app = match result {
        Ok(app) => app,
        Err(e) => {
            error!("Generation failed: {}", e);
            eprintln!("Error generating code: {}", e);
            return 1;
        }
    };

    let formatter = OutputFormatter::new(args.format.into());
    let rendered = match formatter.format_generated(&app) {
        Ok(rendered) => rendered,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    match &args.output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, rendered) {
                eprintln!("Error writing {}: {}", path.display(), e);
                return 1;
            }
            println!("Wrote {}", path.display());
        }
        None => print!("{}", rendered),
    }

    0
}

pub async fn handle_deploy(args: &DeployArgs, quiet: bool) -> i32 {
    let Some(config) = load_config() else {
        return 2;
    };

    let github = GithubClient::with_timeout(
        config.github_endpoint.clone(),
        config.github_token.clone(),
        config.request_timeout(),
    );
    let heroku = HerokuClient::with_timeout(
        config.heroku_endpoint.clone(),
        config.heroku_api_key.clone(),
        config.request_timeout(),
    );
    let ledger = AirtableClient::with_timeout(
        config.airtable_endpoint.clone(),
        config.airtable_token.clone(),
        config.airtable_base.clone(),
        config.airtable_table.clone(),
        config.request_timeout(),
    );
    let webhook = config
        .webhook_url
        .clone()
        .map(|url| WebhookClient::with_timeout(url, config.request_timeout()));

    let settings = OrchestratorSettings {
        default_repo_name: config.default_repo_name.clone(),
        platform_api_key: config.heroku_api_key.clone(),
        deploy_timeout: config.deploy_timeout(),
        deploy_poll_interval: config.deploy_poll_interval(),
    };

    let orchestrator =
        DeployOrchestrator::new(composer(&config), github, heroku, ledger, webhook, settings);

    let mut request = GenerationRequest::new(args.idea.clone(), args.kind.into());
    request.repo_name = args.repo_name.clone();
    request.pitch_deck = args.pitch_deck;
    request.document = args.document;

    let pb = spinner("Deploying application...", quiet);
    let result = orchestrator.execute(request).await;
    pb.finish_and_clear();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Deployment failed during {}: {}", e.step(), e);
            eprintln!("Error during {}: {}", e.step(), e);
            return 1;
        }
    };

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_outcome(&outcome) {
        Ok(rendered) => {
            print!("{}", rendered);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

pub async fn handle_artifacts(args: &ArtifactsArgs) -> i32 {
    let Some(config) = load_config() else {
        return 2;
    };

    let ledger = AirtableClient::with_timeout(
        config.airtable_endpoint.clone(),
        config.airtable_token.clone(),
        config.airtable_base.clone(),
        config.airtable_table.clone(),
        config.request_timeout(),
    );

    let record = match ledger.find_by_uid(&args.unique_id).await {
        Ok(found) => found.map(|(_, record)| record),
        Err(e) => {
            error!("Artifact lookup failed: {}", e);
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_artifacts(&args.unique_id, record.as_ref()) {
        Ok(rendered) => {
            print!("{}", rendered);
            if record.is_some() {
                0
            } else {
                1
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

pub async fn handle_health(args: &HealthArgs) -> i32 {
    let Some(config) = load_config() else {
        return 2;
    };

    let mut results = BTreeMap::new();

    match llm_client(&config).health_check().await {
        Ok(true) => results.insert(
            "llm".to_string(),
            HealthStatus {
                healthy: true,
                detail: format!("{} reachable", config.llm_endpoint),
            },
        ),
        Ok(false) => results.insert(
            "llm".to_string(),
            HealthStatus {
                healthy: false,
                detail: "unreachable or unauthorized".to_string(),
            },
        ),
        Err(e) => results.insert(
            "llm".to_string(),
            HealthStatus {
                healthy: false,
                detail: e.to_string(),
            },
        ),
    };

    let github = GithubClient::with_timeout(
        config.github_endpoint.clone(),
        config.github_token.clone(),
        config.request_timeout(),
    );
    match github.authenticated_user().await {
        Ok(login) => results.insert(
            "github".to_string(),
            HealthStatus {
                healthy: true,
                detail: format!("authenticated as {}", login),
            },
        ),
        Err(e) => results.insert(
            "github".to_string(),
            HealthStatus {
                healthy: false,
                detail: e.to_string(),
            },
        ),
    };

    let heroku = HerokuClient::with_timeout(
        config.heroku_endpoint.clone(),
        config.heroku_api_key.clone(),
        config.request_timeout(),
    );
    match heroku.health_check().await {
        Ok(healthy) => results.insert(
            "heroku".to_string(),
            HealthStatus {
                healthy,
                detail: if healthy {
                    "account accessible".to_string()
                } else {
                    "unreachable or unauthorized".to_string()
                },
            },
        ),
        Err(e) => results.insert(
            "heroku".to_string(),
            HealthStatus {
                healthy: false,
                detail: e.to_string(),
            },
        ),
    };

    let ledger = AirtableClient::with_timeout(
        config.airtable_endpoint.clone(),
        config.airtable_token.clone(),
        config.airtable_base.clone(),
        config.airtable_table.clone(),
        config.request_timeout(),
    );
    match ledger.health_check().await {
        Ok(healthy) => results.insert(
            "ledger".to_string(),
            HealthStatus {
                healthy,
                detail: if healthy {
                    format!("table '{}' accessible", config.airtable_table)
                } else {
                    "unreachable or unauthorized".to_string()
                },
            },
        ),
        Err(e) => results.insert(
            "ledger".to_string(),
            HealthStatus {
                healthy: false,
                detail: e.to_string(),
            },
        ),
    };

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_health(&results) {
        Ok(rendered) => {
            print!("{}", rendered);
            if results.values().all(|s| s.healthy) {
                0
            } else {
                1
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}
