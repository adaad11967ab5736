//! REST client for the source-hosting API
//!
//! Covers exactly the operations the workflow needs: authenticated-user
//! lookup, repository creation with collision handling, contents
//! create/update, and workflow dispatch. Each file push is an independent
//! commit; a partial failure leaves the repository half-populated with no
//! rollback.

use crate::github::PublishError;
use crate::util::short_suffix;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A created remote repository
#[derive(Debug, Clone)]
pub struct RemoteRepository {
    pub owner: String,
    pub name: String,
}

impl RemoteRepository {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Thin client over the source-host REST API
pub struct GithubClient {
    endpoint: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    name: String,
    owner: OwnerResponse,
}

#[derive(Debug, Deserialize)]
struct OwnerResponse {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
}

impl GithubClient {
    pub fn new(endpoint: String, token: String) -> Self {
        Self::with_timeout(endpoint, token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(endpoint: String, token: String, timeout: Duration) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        let mut auth = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token))
            .expect("token is valid header material");
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("appforge/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self { endpoint, http }
    }

    /// Login of the token's user, used as repository owner
    pub async fn authenticated_user(&self) -> Result<String, PublishError> {
        let url = format!("{}/user", self.endpoint);
        let response = self.http.get(&url).send().await.map_err(map_send_err)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| PublishError::InvalidResponse(e.to_string()))?;
        Ok(user.login)
    }

    /// Whether a repository with this name already exists for the owner
    pub async fn repo_exists(&self, owner: &str, name: &str) -> Result<bool, PublishError> {
        let url = format!("{}/repos/{}/{}", self.endpoint, owner, name);
        let response = self.http.get(&url).send().await.map_err(map_send_err)?;

        match response.status().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(PublishError::Api {
                    status,
                    message: body,
                })
            }
        }
    }

    /// Picks a repository name that is free at call time
    ///
    /// When the desired name is taken, one uniquified candidate
    /// (`name-<8 hex chars>`) is tried; if that is also taken the call fails
    /// rather than looping.
    pub async fn resolve_repo_name(
        &self,
        owner: &str,
        desired: &str,
    ) -> Result<String, PublishError> {
        if !self.repo_exists(owner, desired).await? {
            return Ok(desired.to_string());
        }

        let candidate = format!("{}-{}", desired, short_suffix());
        warn!(
            "Repository '{}' already exists; trying '{}'",
            desired, candidate
        );

        if self.repo_exists(owner, &candidate).await? {
            return Err(PublishError::NameExhausted(candidate));
        }
        Ok(candidate)
    }

    /// Creates the repository under the authenticated user
    pub async fn create_repo(&self, name: &str) -> Result<RemoteRepository, PublishError> {
        let url = format!("{}/user/repos", self.endpoint);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "name": name, "auto_init": false }))
            .send()
            .await
            .map_err(map_send_err)?;

        let status = response.status();
        if status.as_u16() != 201 {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let repo: RepoResponse = response
            .json()
            .await
            .map_err(|e| PublishError::InvalidResponse(e.to_string()))?;

        info!("Created repository {}/{}", repo.owner.login, repo.name);
        Ok(RemoteRepository {
            owner: repo.owner.login,
            name: repo.name,
        })
    }

    /// Commits a new file via the contents API
    pub async fn create_file(
        &self,
        repo: &RemoteRepository,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), PublishError> {
        let url = format!(
            "{}/repos/{}/contents/{}",
            self.endpoint,
            repo.full_name(),
            path
        );
        let response = self
            .http
            .put(&url)
            .json(&json!({
                "message": message,
                "content": STANDARD.encode(content),
            }))
            .send()
            .await
            .map_err(map_send_err)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        debug!("Pushed {} to {}", path, repo.full_name());
        Ok(())
    }

    /// Blob sha of an existing file, required for updates
    pub async fn get_file_sha(
        &self,
        repo: &RemoteRepository,
        path: &str,
    ) -> Result<String, PublishError> {
        let url = format!(
            "{}/repos/{}/contents/{}",
            self.endpoint,
            repo.full_name(),
            path
        );
        let response = self.http.get(&url).send().await.map_err(map_send_err)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let contents: ContentsResponse = response
            .json()
            .await
            .map_err(|e| PublishError::InvalidResponse(e.to_string()))?;
        Ok(contents.sha)
    }

    /// Overwrites an existing file, committing against its prior blob sha
    pub async fn update_file(
        &self,
        repo: &RemoteRepository,
        path: &str,
        content: &str,
        message: &str,
        sha: &str,
    ) -> Result<(), PublishError> {
        let url = format!(
            "{}/repos/{}/contents/{}",
            self.endpoint,
            repo.full_name(),
            path
        );
        let response = self
            .http
            .put(&url)
            .json(&json!({
                "message": message,
                "content": STANDARD.encode(content),
                "sha": sha,
            }))
            .send()
            .await
            .map_err(map_send_err)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        debug!("Updated {} in {}", path, repo.full_name());
        Ok(())
    }

    /// Triggers a workflow run directly instead of pushing an empty commit
    pub async fn dispatch_workflow(
        &self,
        repo: &RemoteRepository,
        workflow_file: &str,
        git_ref: &str,
    ) -> Result<(), PublishError> {
        let url = format!(
            "{}/repos/{}/actions/workflows/{}/dispatches",
            self.endpoint,
            repo.full_name(),
            workflow_file
        );
        let response = self
            .http
            .post(&url)
            .json(&json!({ "ref": git_ref }))
            .send()
            .await
            .map_err(map_send_err)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        info!(
            "Dispatched workflow {} on {} ({})",
            workflow_file,
            repo.full_name(),
            git_ref
        );
        Ok(())
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn map_send_err(e: reqwest::Error) -> PublishError {
    PublishError::Network(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let repo = RemoteRepository {
            owner: "octocat".to_string(),
            name: "demo-app".to_string(),
        };
        assert_eq!(repo.full_name(), "octocat/demo-app");
    }
}
