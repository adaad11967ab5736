//! Platform-as-a-service integration: app creation and release polling

pub mod client;

use thiserror::Error;

pub use client::{derive_app_name, HerokuClient, PlatformApp, ReleaseStatus};

/// Errors from the platform deployment step
#[derive(Debug, Error)]
pub enum PlatformError {
    /// App creation did not return 201; the workflow halts before any CI
    /// file is committed
    #[error("platform app creation rejected ({status}): {message}")]
    CreateRejected { status: u16, message: String },

    /// API request failed with a non-success status
    #[error("platform API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network-related error
    #[error("platform request failed: {0}")]
    Network(String),

    /// The release reached a terminal failed state
    #[error("release v{version} failed")]
    ReleaseFailed { version: i64 },

    /// No release reached a terminal state within the poll budget
    #[error("no release completed within {seconds} seconds")]
    ReleaseTimeout { seconds: u64 },

    /// The response body could not be interpreted
    #[error("unexpected response from platform: {0}")]
    InvalidResponse(String),
}
