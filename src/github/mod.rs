//! Source-host integration: repository publishing and secret provisioning

pub mod client;
pub mod secrets;

use thiserror::Error;

pub use client::{GithubClient, RemoteRepository};
pub use secrets::{seal_secret, RepoPublicKey, SealedSecret};

/// Errors from repository creation and file pushes
#[derive(Debug, Error)]
pub enum PublishError {
    /// API request failed with a non-success status
    #[error("source host API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network-related error
    #[error("source host request failed: {0}")]
    Network(String),

    /// The uniquified candidate name was also taken
    #[error("repository name '{0}' still taken after uniquification")]
    NameExhausted(String),

    /// The response body could not be interpreted
    #[error("unexpected response from source host: {0}")]
    InvalidResponse(String),
}

/// Errors from secret provisioning
///
/// Any of these aborts the remaining workflow; a repository without its
/// platform secret cannot release.
#[derive(Debug, Error)]
pub enum SecretError {
    /// Fetching the repository public key failed
    #[error("public key fetch failed ({status}): {message}")]
    KeyFetch { status: u16, message: String },

    /// The fetched key was not valid base64 or not 32 bytes
    #[error("invalid repository public key: {0}")]
    InvalidKey(String),

    /// Sealed-box encryption failed
    #[error("sealing secret failed: {0}")]
    Seal(String),

    /// Uploading the sealed secret failed
    #[error("secret upload failed ({status}): {message}")]
    Upload { status: u16, message: String },

    /// Network-related error
    #[error("secret provisioning request failed: {0}")]
    Network(String),
}
