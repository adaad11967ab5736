//! Configuration management for appforge
//!
//! Loads settings from environment variables (a `.env` file is honored via
//! `dotenv` in `main`). Credentials for each of the four external services
//! are required; the process refuses to start without them. Endpoints are
//! overridable, which is also how the test suite points clients at a mock
//! server.
//!
//! # Environment Variables
//!
//! ## Required credentials
//! - `OPENAI_API_KEY`: LLM chat-completion API key
//! - `GITHUB_TOKEN`: source host token with repo + secrets scope
//! - `HEROKU_API_KEY`: platform API key (also sealed into each repository)
//! - `AIRTABLE_TOKEN`: ledger personal access token
//! - `AIRTABLE_BASE_ID`: ledger base identifier
//!
//! ## Optional
//! - `AIRTABLE_TABLE`: ledger table name - default: "Deployments"
//! - `APPFORGE_WEBHOOK_URL`: auxiliary-material automation webhook (fan-out
//!   is skipped when unset)
//! - `APPFORGE_REPO_NAME`: default repository name - default:
//!   "generated-streamlit-app"
//! - `APPFORGE_LLM_ENDPOINT`: default: "https://api.openai.com"
//! - `APPFORGE_LLM_MODEL`: default: "gpt-4"
//! - `APPFORGE_GITHUB_ENDPOINT`: default: "https://api.github.com"
//! - `APPFORGE_HEROKU_ENDPOINT`: default: "https://api.heroku.com"
//! - `APPFORGE_AIRTABLE_ENDPOINT`: default: "https://api.airtable.com"
//! - `APPFORGE_REQUEST_TIMEOUT`: per-request timeout in seconds - default: "30"
//! - `APPFORGE_DEPLOY_TIMEOUT`: release-poll budget in seconds - default: "300"
//! - `APPFORGE_DEPLOY_POLL_INTERVAL`: seconds between polls - default: "10"
//! - `APPFORGE_UNMAPPED_IMPORTS`: `passthrough` | `drop` - default: "passthrough"
//! - `APPFORGE_LOG_LEVEL`: default: "info"

use crate::generate::deps::UnmappedPolicy;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_LLM_ENDPOINT: &str = "https://api.openai.com";
const DEFAULT_LLM_MODEL: &str = "gpt-4";
const DEFAULT_GITHUB_ENDPOINT: &str = "https://api.github.com";
const DEFAULT_HEROKU_ENDPOINT: &str = "https://api.heroku.com";
const DEFAULT_AIRTABLE_ENDPOINT: &str = "https://api.airtable.com";
const DEFAULT_AIRTABLE_TABLE: &str = "Deployments";
const DEFAULT_REPO_NAME: &str = "generated-streamlit-app";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DEPLOY_TIMEOUT_SECS: u64 = 300;
const DEFAULT_DEPLOY_POLL_SECS: u64 = 10;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    /// Failed to parse a configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Main configuration structure for appforge
///
/// Construct with [`ForgeConfig::from_env`], which fails fast when any
/// required credential is absent.
#[derive(Debug, Clone)]
pub struct ForgeConfig {
    /// LLM chat-completion endpoint
    pub llm_endpoint: String,

    /// LLM API key
    pub llm_api_key: String,

    /// Model name for generation requests
    pub llm_model: String,

    /// Source host API endpoint
    pub github_endpoint: String,

    /// Source host token
    pub github_token: String,

    /// Platform API endpoint
    pub heroku_endpoint: String,

    /// Platform API key, sealed into each published repository
    pub heroku_api_key: String,

    /// Ledger API endpoint
    pub airtable_endpoint: String,

    /// Ledger access token
    pub airtable_token: String,

    /// Ledger base identifier
    pub airtable_base: String,

    /// Ledger table name
    pub airtable_table: String,

    /// Auxiliary-material automation webhook; fan-out skipped when unset
    pub webhook_url: Option<String>,

    /// Default repository name when the request does not carry one
    pub default_repo_name: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Total budget for release-status polling in seconds
    pub deploy_timeout_secs: u64,

    /// Interval between release-status polls in seconds
    pub deploy_poll_secs: u64,

    /// Policy for imports absent from the package table
    pub unmapped_imports: UnmappedPolicy,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl ForgeConfig {
    /// Loads configuration from the environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingVar` for any absent required credential
    /// and `ConfigError::ParseError` for malformed numeric or policy values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            llm_endpoint: env_or(
                "APPFORGE_LLM_ENDPOINT",
                DEFAULT_LLM_ENDPOINT,
            ),
            llm_api_key: required("OPENAI_API_KEY")?,
            llm_model: env_or("APPFORGE_LLM_MODEL", DEFAULT_LLM_MODEL),
            github_endpoint: env_or("APPFORGE_GITHUB_ENDPOINT", DEFAULT_GITHUB_ENDPOINT),
            github_token: required("GITHUB_TOKEN")?,
            heroku_endpoint: env_or("APPFORGE_HEROKU_ENDPOINT", DEFAULT_HEROKU_ENDPOINT),
            heroku_api_key: required("HEROKU_API_KEY")?,
            airtable_endpoint: env_or("APPFORGE_AIRTABLE_ENDPOINT", DEFAULT_AIRTABLE_ENDPOINT),
            airtable_token: required("AIRTABLE_TOKEN")?,
            airtable_base: required("AIRTABLE_BASE_ID")?,
            airtable_table: env_or("AIRTABLE_TABLE", DEFAULT_AIRTABLE_TABLE),
            webhook_url: env::var("APPFORGE_WEBHOOK_URL").ok().filter(|v| !v.is_empty()),
            default_repo_name: env_or("APPFORGE_REPO_NAME", DEFAULT_REPO_NAME),
            request_timeout_secs: parsed("APPFORGE_REQUEST_TIMEOUT", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            deploy_timeout_secs: parsed("APPFORGE_DEPLOY_TIMEOUT", DEFAULT_DEPLOY_TIMEOUT_SECS)?,
            deploy_poll_secs: parsed("APPFORGE_DEPLOY_POLL_INTERVAL", DEFAULT_DEPLOY_POLL_SECS)?,
            unmapped_imports: policy_from_env()?,
            log_level: env::var("APPFORGE_LOG_LEVEL")
                .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
                .to_lowercase(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates numeric ranges and the log level
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any check fails
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        if self.deploy_poll_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Deploy poll interval must be at least 1 second".to_string(),
            ));
        }
        if self.deploy_timeout_secs < self.deploy_poll_secs {
            return Err(ConfigError::ValidationFailed(
                "Deploy timeout must be at least one poll interval".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Per-request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Release-poll budget as a `Duration`
    pub fn deploy_timeout(&self) -> Duration {
        Duration::from_secs(self.deploy_timeout_secs)
    }

    /// Release-poll interval as a `Duration`
    pub fn deploy_poll_interval(&self) -> Duration {
        Duration::from_secs(self.deploy_poll_secs)
    }
}

fn required(key: &str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingVar(key.to_string()))
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parsed(key: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.parse::<u64>().map_err(|e| ConfigError::ParseError {
            field: key.to_string(),
            error: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn policy_from_env() -> Result<UnmappedPolicy, ConfigError> {
    match env::var("APPFORGE_UNMAPPED_IMPORTS") {
        Ok(raw) => raw
            .parse::<UnmappedPolicy>()
            .map_err(|e| ConfigError::ParseError {
                field: "APPFORGE_UNMAPPED_IMPORTS".to_string(),
                error: e,
            }),
        Err(_) => Ok(UnmappedPolicy::default()),
    }
}

impl fmt::Display for ForgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Appforge Configuration:")?;
        writeln!(f, "  LLM Endpoint: {}", self.llm_endpoint)?;
        writeln!(f, "  LLM Model: {}", self.llm_model)?;
        writeln!(f, "  LLM API Key: {}", mask(&self.llm_api_key))?;
        writeln!(f, "  GitHub Endpoint: {}", self.github_endpoint)?;
        writeln!(f, "  GitHub Token: {}", mask(&self.github_token))?;
        writeln!(f, "  Heroku Endpoint: {}", self.heroku_endpoint)?;
        writeln!(f, "  Heroku API Key: {}", mask(&self.heroku_api_key))?;
        writeln!(f, "  Airtable Endpoint: {}", self.airtable_endpoint)?;
        writeln!(f, "  Airtable Base: {}", self.airtable_base)?;
        writeln!(f, "  Airtable Table: {}", self.airtable_table)?;
        writeln!(
            f,
            "  Webhook URL: {}",
            self.webhook_url.as_deref().unwrap_or("(unset)")
        )?;
        writeln!(f, "  Default Repo Name: {}", self.default_repo_name)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Deploy Timeout: {}s", self.deploy_timeout_secs)?;
        writeln!(f, "  Deploy Poll Interval: {}s", self.deploy_poll_secs)?;
        writeln!(f, "  Unmapped Imports: {}", self.unmapped_imports)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() {
        "(unset)"
    } else {
        "(set)"
    }
}
