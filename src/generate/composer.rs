//! The prompt composer: one LLM round trip per generation request

use crate::generate::deps::{render_manifest, UnmappedPolicy};
use crate::generate::extract::extract_code_block;
use crate::generate::kind::AppKind;
use crate::generate::prompt::{PromptBuilder, SYSTEM_PROMPT};
use crate::generate::GenerationError;
use crate::llm::backend::ChatBackend;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// A user's request to generate an application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Free-text idea
    pub idea: String,

    /// Selected application kind
    pub kind: AppKind,

    /// Desired repository name; the configured default applies when unset
    pub repo_name: Option<String>,

    /// Request a pitch deck from the auxiliary automation
    pub pitch_deck: bool,

    /// Request a one-pager document from the auxiliary automation
    pub document: bool,
}

impl GenerationRequest {
    pub fn new(idea: impl Into<String>, kind: AppKind) -> Self {
        Self {
            idea: idea.into(),
            kind,
            repo_name: None,
            pitch_deck: false,
            document: false,
        }
    }
}

/// Generated application source plus its rendered dependency manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedApp {
    pub kind: AppKind,
    pub source: String,
    pub manifest: String,
}

/// Builds the LLM request and turns the reply into a [`GeneratedApp`]
pub struct Composer {
    backend: Arc<dyn ChatBackend>,
    policy: UnmappedPolicy,
}

impl Composer {
    pub fn new(backend: Arc<dyn ChatBackend>, policy: UnmappedPolicy) -> Self {
        Self { backend, policy }
    }

    /// Runs one generation round trip
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` when the backend call fails, the reply has
    /// no matching fenced block, or the extracted source is blank.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedApp, GenerationError> {
        info!(
            "Generating {} app via {} backend",
            request.kind,
            self.backend.name()
        );

        let user_prompt = PromptBuilder::build_generation_prompt(request);
        debug!("Built prompt with {} characters", user_prompt.len());

        let reply = self.backend.complete(SYSTEM_PROMPT, &user_prompt).await?;
        debug!("Received reply with {} characters", reply.len());

        let source = extract_code_block(&reply, request.kind)?;
        if source.trim().is_empty() {
            return Err(GenerationError::EmptySource);
        }

        let manifest = render_manifest(&source, request.kind, self.policy);

        info!(
            "Generated {} bytes of source, {} manifest entries",
            source.len(),
            manifest.lines().count()
        );

        Ok(GeneratedApp {
            kind: request.kind,
            source,
            manifest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockChatBackend;

    fn composer_with_reply(reply: &str) -> Composer {
        let mock = MockChatBackend::new();
        mock.push_reply(reply);
        Composer::new(Arc::new(mock), UnmappedPolicy::Passthrough)
    }

    #[tokio::test]
    async fn test_generate_extracts_source_and_manifest() {
        let composer = composer_with_reply(
            "```python\nimport streamlit as st\nst.title(\"Todo\")\n```",
        );
        let request = GenerationRequest::new("a todo list app", AppKind::Streamlit);

        let app = composer.generate(&request).await.unwrap();
        assert!(app.source.contains("import streamlit"));
        assert!(app.manifest.lines().any(|l| l == "streamlit"));
    }

    #[tokio::test]
    async fn test_generate_without_block_fails_typed() {
        let composer = composer_with_reply("I'd rather describe the app in prose.");
        let request = GenerationRequest::new("a todo list app", AppKind::Streamlit);

        let result = composer.generate(&request).await;
        assert!(matches!(
            result,
            Err(GenerationError::MissingCodeBlock { .. })
        ));
    }

    #[tokio::test]
    async fn test_blank_block_is_empty_source() {
        let composer = composer_with_reply("```python\n   \n```");
        let request = GenerationRequest::new("anything", AppKind::Streamlit);

        let result = composer.generate(&request).await;
        assert!(matches!(result, Err(GenerationError::EmptySource)));
    }
}
