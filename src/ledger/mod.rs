//! Deployment bookkeeping in the external tabular ledger

pub mod client;
pub mod record;

use thiserror::Error;

pub use client::AirtableClient;
pub use record::{DeploymentRecord, Status};

/// Errors from ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    /// API request failed with a non-success status
    #[error("ledger API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network-related error
    #[error("ledger request failed: {0}")]
    Network(String),

    /// No row exists for the identifier
    #[error("no ledger record for identifier {0}")]
    RecordNotFound(String),

    /// Status would move backwards
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: Status, to: Status },

    /// The response body could not be interpreted
    #[error("unexpected response from ledger: {0}")]
    InvalidResponse(String),
}
