//! Code generation: prompt composition, fenced-block extraction, and
//! dependency inference for the generated source.

pub mod composer;
pub mod deps;
pub mod extract;
pub mod kind;
pub mod prompt;
pub mod templates;

use crate::llm::backend::BackendError;
use thiserror::Error;

pub use composer::{Composer, GeneratedApp, GenerationRequest};
pub use deps::UnmappedPolicy;
pub use kind::AppKind;

/// Errors from the generation step
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The backend call itself failed
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The reply contained no fenced block with the expected tag
    #[error("LLM reply contains no fenced ```{tag} code block")]
    MissingCodeBlock { tag: &'static str },

    /// The extracted block was blank
    #[error("Generated source is empty")]
    EmptySource,
}
