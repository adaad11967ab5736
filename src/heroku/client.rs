//! REST client for the platform-as-a-service API
//!
//! App creation requires a 201; anything else halts the workflow. Release
//! state is polled with bounded retries and an explicit deadline instead of
//! sleeping and assuming success.

use crate::heroku::PlatformError;
use crate::util::short_suffix;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum length of the name portion before the uniquifying suffix
const APP_NAME_BASE_MAX: usize = 20;

/// A created platform application
#[derive(Debug, Clone)]
pub struct PlatformApp {
    pub name: String,
    pub web_url: String,
}

/// Terminal and pending release states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStatus {
    Pending,
    Succeeded,
    Failed,
}

/// Derives a platform app name from a repository name
///
/// Lowercases, strips characters outside `[a-z0-9-]`, truncates the base to
/// 20 characters, and appends an 8-hex-char suffix for uniqueness. The
/// result always fits the platform's 30-character limit.
pub fn derive_app_name(repo_name: &str) -> String {
    let base: String = repo_name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();

    let mut base = base.trim_matches('-').to_string();
    base.truncate(APP_NAME_BASE_MAX);
    let base = base.trim_end_matches('-');

    if base.is_empty() {
        format!("app-{}", short_suffix())
    } else {
        format!("{}-{}", base, short_suffix())
    }
}

/// Thin client over the platform REST API
pub struct HerokuClient {
    endpoint: String,
    api_key: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct AppResponse {
    name: String,
    web_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Release {
    version: i64,
    status: String,
}

impl HerokuClient {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self::with_timeout(endpoint, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(endpoint: String, api_key: String, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("appforge/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            endpoint,
            api_key,
            http,
        }
    }

    fn accept_header(&self) -> (&'static str, &'static str) {
        ("Accept", "application/vnd.heroku+json; version=3")
    }

    /// Creates a container-stack application
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::CreateRejected` for any status other than
    /// 201, carrying the response body for diagnosis.
    pub async fn create_app(&self, name: &str) -> Result<PlatformApp, PlatformError> {
        let url = format!("{}/apps", self.endpoint);
        let (accept, accept_value) = self.accept_header();

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(accept, accept_value)
            .json(&json!({ "name": name, "stack": "container" }))
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() != 201 {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::CreateRejected {
                status: status.as_u16(),
                message: body,
            });
        }

        let app: AppResponse = response
            .json()
            .await
            .map_err(|e| PlatformError::InvalidResponse(e.to_string()))?;

        let web_url = app
            .web_url
            .unwrap_or_else(|| format!("https://{}.herokuapp.com", app.name));

        info!("Created platform app {} ({})", app.name, web_url);
        Ok(PlatformApp {
            name: app.name,
            web_url,
        })
    }

    /// Version and status of the newest release, if any exist
    pub async fn latest_release(
        &self,
        app_name: &str,
    ) -> Result<Option<(i64, ReleaseStatus)>, PlatformError> {
        let url = format!("{}/apps/{}/releases", self.endpoint, app_name);
        let (accept, accept_value) = self.accept_header();

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(accept, accept_value)
            .header("Range", "version ..; order=desc, max=10")
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let releases: Vec<Release> = response
            .json()
            .await
            .map_err(|e| PlatformError::InvalidResponse(e.to_string()))?;

        Ok(releases
            .into_iter()
            .max_by_key(|r| r.version)
            .map(|r| (r.version, parse_status(&r.status))))
    }

    /// Polls until a release newer than `after_version` reaches a terminal
    /// state
    ///
    /// # Errors
    ///
    /// Returns `ReleaseFailed` when the release lands in a failed state and
    /// `ReleaseTimeout` when the deadline passes with nothing terminal.
    pub async fn wait_for_release(
        &self,
        app_name: &str,
        after_version: i64,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<i64, PlatformError> {
        let deadline = Instant::now() + timeout;

        info!(
            "Waiting up to {}s for a release of {} after v{}",
            timeout.as_secs(),
            app_name,
            after_version
        );

        loop {
            match self.latest_release(app_name).await? {
                Some((version, status)) if version > after_version => match status {
                    ReleaseStatus::Succeeded => {
                        info!("Release v{} of {} succeeded", version, app_name);
                        return Ok(version);
                    }
                    ReleaseStatus::Failed => {
                        warn!("Release v{} of {} failed", version, app_name);
                        return Err(PlatformError::ReleaseFailed { version });
                    }
                    ReleaseStatus::Pending => {
                        debug!("Release v{} of {} still pending", version, app_name);
                    }
                },
                _ => {
                    debug!("No new release of {} yet", app_name);
                }
            }

            if Instant::now() + poll_interval > deadline {
                return Err(PlatformError::ReleaseTimeout {
                    seconds: timeout.as_secs(),
                });
            }
            sleep(poll_interval).await;
        }
    }

    /// Verifies the API key with a lightweight account lookup
    pub async fn health_check(&self) -> Result<bool, PlatformError> {
        let url = format!("{}/account", self.endpoint);
        let (accept, accept_value) = self.accept_header();

        match self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(accept, accept_value)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) if e.is_timeout() || e.is_connect() => Ok(false),
            Err(e) => Err(PlatformError::Network(e.to_string())),
        }
    }
}

fn parse_status(raw: &str) -> ReleaseStatus {
    match raw {
        "succeeded" => ReleaseStatus::Succeeded,
        "failed" => ReleaseStatus::Failed,
        _ => ReleaseStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_app_name_pattern() {
        let name = derive_app_name("Demo-App");
        let (base, suffix) = name.rsplit_once('-').unwrap();
        assert_eq!(base, "demo-app");
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_derive_app_name_strips_and_truncates() {
        let name = derive_app_name("My_Very! Long Repository Name With Symbols");
        assert!(name.len() <= 30);
        assert!(name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        assert!(!name.starts_with('-'));
    }

    #[test]
    fn test_derive_app_name_empty_base() {
        let name = derive_app_name("!!!");
        assert!(name.starts_with("app-"));
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("succeeded"), ReleaseStatus::Succeeded);
        assert_eq!(parse_status("failed"), ReleaseStatus::Failed);
        assert_eq!(parse_status("pending"), ReleaseStatus::Pending);
        assert_eq!(parse_status("unknown"), ReleaseStatus::Pending);
    }
}
