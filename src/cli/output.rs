//! Output formatting for multiple formats
//!
//! Formatters for JSON, YAML, and human-readable text covering the
//! generation result, the deployment outcome, artifact lookups, and health
//! checks.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::generate::composer::GeneratedApp;
use crate::ledger::record::DeploymentRecord;
use crate::workflow::orchestrator::DeploymentOutcome;

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Health of one external service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub detail: String,
}

/// Output formatter for workflow results
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a generation result
    pub fn format_generated(&self, app: &GeneratedApp) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(app).context("Failed to serialize generated app")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(app).context("Failed to serialize generated app")
            }
            OutputFormat::Human => {
                let mut out = String::new();
                out.push_str(&format!("# Generated {} application\n\n", app.kind));
                out.push_str(&app.source);
                if !app.source.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str("\n# requirements.txt\n");
                out.push_str(&app.manifest);
                Ok(out)
            }
        }
    }

    /// Formats a deployment outcome
    pub fn format_outcome(&self, outcome: &DeploymentOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(outcome).context("Failed to serialize outcome")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(outcome).context("Failed to serialize outcome")
            }
            OutputFormat::Human => {
                let mut out = String::new();
                out.push_str("Deployment complete\n");
                out.push_str(&format!("  Identifier:  {}\n", outcome.unique_id));
                out.push_str(&format!("  Repository:  {}\n", outcome.repository));
                out.push_str(&format!("  App:         {}\n", outcome.app_name));
                out.push_str(&format!("  URL:         {}\n", outcome.app_url));
                out.push_str(&format!("  Release:     v{}\n", outcome.release_version));
                if outcome.aux_triggered {
                    match &outcome.aux_error {
                        None => out.push_str("  Auxiliary:   triggered\n"),
                        Some(e) => out.push_str(&format!("  Auxiliary:   failed ({})\n", e)),
                    }
                } else if let Some(e) = &outcome.aux_error {
                    out.push_str(&format!("  Auxiliary:   skipped ({})\n", e));
                }
                out.push_str(&format!("  Elapsed:     {}s\n", outcome.elapsed_secs));
                Ok(out)
            }
        }
    }

    /// Formats an artifact lookup for a ledger row
    pub fn format_artifacts(&self, unique_id: &str, record: Option<&DeploymentRecord>) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&record)
                .context("Failed to serialize artifact lookup"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(&record).context("Failed to serialize artifact lookup")
            }
            OutputFormat::Human => {
                let Some(record) = record else {
                    return Ok(format!("No ledger record for {}\n", unique_id));
                };

                let mut out = String::new();
                out.push_str(&format!("Deployment {}\n", record.unique_id));
                out.push_str(&format!("  Status:      {}\n", record.status));
                match (&record.pitch_deck, &record.pitch_deck_url) {
                    (true, Some(url)) => out.push_str(&format!("  Pitch deck:  {}\n", url)),
                    (true, None) => out.push_str("  Pitch deck:  not ready yet\n"),
                    (false, _) => {}
                }
                match (&record.document, &record.document_url) {
                    (true, Some(url)) => out.push_str(&format!("  Document:    {}\n", url)),
                    (true, None) => out.push_str("  Document:    not ready yet\n"),
                    (false, _) => {}
                }
                if !record.pitch_deck && !record.document {
                    out.push_str("  No auxiliary documents were requested\n");
                }
                Ok(out)
            }
        }
    }

    /// Formats health check results
    pub fn format_health(&self, results: &BTreeMap<String, HealthStatus>) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(results).context("Failed to serialize health results")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(results).context("Failed to serialize health results")
            }
            OutputFormat::Human => {
                let mut out = String::from("Service health\n");
                for (service, status) in results {
                    let marker = if status.healthy { "ok" } else { "FAIL" };
                    out.push_str(&format!(
                        "  {:<12} {:<5} {}\n",
                        service, marker, status.detail
                    ));
                }
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::kind::AppKind;

    fn sample_app() -> GeneratedApp {
        GeneratedApp {
            kind: AppKind::Streamlit,
            source: "import streamlit as st\n".to_string(),
            manifest: "streamlit\n".to_string(),
        }
    }

    #[test]
    fn test_format_generated_json() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let out = formatter.format_generated(&sample_app()).unwrap();
        assert!(out.contains("\"kind\": \"streamlit\""));
    }

    #[test]
    fn test_format_generated_human_contains_manifest() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let out = formatter.format_generated(&sample_app()).unwrap();
        assert!(out.contains("import streamlit"));
        assert!(out.contains("# requirements.txt"));
    }

    #[test]
    fn test_format_health_human() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let mut results = BTreeMap::new();
        results.insert(
            "github".to_string(),
            HealthStatus {
                healthy: true,
                detail: "authenticated as octocat".to_string(),
            },
        );
        results.insert(
            "heroku".to_string(),
            HealthStatus {
                healthy: false,
                detail: "unreachable".to_string(),
            },
        );

        let out = formatter.format_health(&results).unwrap();
        assert!(out.contains("github"));
        assert!(out.contains("FAIL"));
    }

    #[test]
    fn test_format_artifacts_missing_record() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let out = formatter.format_artifacts("xyz", None).unwrap();
        assert!(out.contains("No ledger record"));
    }
}
