//! Dependency inference for generated Python source
//!
//! Scans import statements, maps top-level module names to installable
//! package names through a fixed table, and renders the dependency manifest.
//! Standard-library modules are skipped. Names absent from the table follow
//! an explicit policy: pass them through under their import name (default)
//! or drop them, with a warning either way.

use crate::generate::kind::AppKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Import name to PyPI package name, for names where the two differ or
/// where presence in the table is the signal that the module is installable
const PACKAGE_MAP: &[(&str, &str)] = &[
    ("streamlit", "streamlit"),
    ("gradio", "gradio"),
    ("dash", "dash"),
    ("openai", "openai"),
    ("requests", "requests"),
    ("github", "PyGithub"),
    ("dotenv", "python-dotenv"),
    ("nacl", "pynacl"),
    ("plotly", "plotly"),
    ("pandas", "pandas"),
    ("numpy", "numpy"),
    ("airtable", "airtable-python-wrapper"),
    ("yaml", "PyYAML"),
    ("PIL", "Pillow"),
    ("sklearn", "scikit-learn"),
    ("bs4", "beautifulsoup4"),
    ("cv2", "opencv-python-headless"),
    ("altair", "altair"),
    ("flask", "flask"),
    ("httpx", "httpx"),
];

/// Python standard-library modules that must never land in the manifest
const STDLIB_MODULES: &[&str] = &[
    "abc", "argparse", "ast", "asyncio", "base64", "collections", "csv", "dataclasses",
    "datetime", "enum", "functools", "hashlib", "io", "itertools", "json", "logging", "math",
    "os", "pathlib", "random", "re", "sqlite3", "string", "subprocess", "sys", "tempfile",
    "textwrap", "threading", "time", "typing", "urllib", "uuid",
];

/// Policy for import names absent from the package table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmappedPolicy {
    /// Keep the import name as the package name
    #[default]
    Passthrough,
    /// Omit the name from the manifest
    Drop,
}

impl FromStr for UnmappedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "passthrough" => Ok(UnmappedPolicy::Passthrough),
            "drop" => Ok(UnmappedPolicy::Drop),
            other => Err(format!(
                "Invalid unmapped-import policy: {}. Valid options: passthrough, drop",
                other
            )),
        }
    }
}

impl fmt::Display for UnmappedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmappedPolicy::Passthrough => write!(f, "passthrough"),
            UnmappedPolicy::Drop => write!(f, "drop"),
        }
    }
}

/// Collects deduplicated top-level module names from import statements
///
/// Handles both plain (`import a.b, c as d`) and from (`from x.y import z`)
/// forms. Indented imports count; comment lines do not.
pub fn extract_imports(source: &str) -> BTreeSet<String> {
    let mut modules = BTreeSet::new();

    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("from ") {
            if let Some(module) = rest.split_whitespace().next() {
                if let Some(top) = top_level(module) {
                    modules.insert(top.to_string());
                }
            }
        } else if let Some(rest) = trimmed.strip_prefix("import ") {
            for part in rest.split(',') {
                if let Some(module) = part.split_whitespace().next() {
                    if let Some(top) = top_level(module) {
                        modules.insert(top.to_string());
                    }
                }
            }
        }
    }

    modules
}

fn top_level(module: &str) -> Option<&str> {
    let top = module.split('.').next()?;
    let valid = !top.is_empty()
        && top
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !top.starts_with(|c: char| c.is_ascii_digit());
    valid.then_some(top)
}

/// Renders the dependency manifest for generated source
///
/// The result is a sorted, deduplicated package list, one per line. The
/// kind's UI package is always present regardless of whether it was
/// detected in the imports. Rendering is idempotent: the same source always
/// yields the same manifest.
pub fn render_manifest(source: &str, kind: AppKind, policy: UnmappedPolicy) -> String {
    let mut packages = BTreeSet::new();

    for module in extract_imports(source) {
        if STDLIB_MODULES.contains(&module.as_str()) {
            continue;
        }

        match lookup(&module) {
            Some(package) => {
                packages.insert(package.to_string());
            }
            None => match policy {
                UnmappedPolicy::Passthrough => {
                    warn!(
                        "Import '{}' is not in the package table; passing it through as-is",
                        module
                    );
                    packages.insert(module);
                }
                UnmappedPolicy::Drop => {
                    warn!(
                        "Import '{}' is not in the package table; dropping it from the manifest",
                        module
                    );
                }
            },
        }
    }

    packages.insert(kind.ui_package().to_string());

    let mut manifest = packages.into_iter().collect::<Vec<_>>().join("\n");
    manifest.push('\n');
    manifest
}

fn lookup(module: &str) -> Option<&'static str> {
    PACKAGE_MAP
        .iter()
        .find(|(import, _)| *import == module)
        .map(|(_, package)| *package)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
import streamlit as st
import os, json
from github import Github
from dotenv import load_dotenv
import pandas.io.json
# import commented_out
";

    #[test]
    fn test_extract_imports_both_forms() {
        let imports = extract_imports(SAMPLE);
        assert!(imports.contains("streamlit"));
        assert!(imports.contains("os"));
        assert!(imports.contains("json"));
        assert!(imports.contains("github"));
        assert!(imports.contains("dotenv"));
        assert!(imports.contains("pandas"));
        assert!(!imports.contains("commented_out"));
    }

    #[test]
    fn test_manifest_maps_and_skips_stdlib() {
        let manifest = render_manifest(SAMPLE, AppKind::Streamlit, UnmappedPolicy::Passthrough);
        assert!(manifest.contains("PyGithub"));
        assert!(manifest.contains("python-dotenv"));
        assert!(manifest.contains("pandas"));
        assert!(!manifest.lines().any(|l| l == "os"));
        assert!(!manifest.lines().any(|l| l == "json"));
    }

    #[test]
    fn test_ui_package_always_present() {
        let manifest = render_manifest(
            "print('no imports at all')",
            AppKind::Streamlit,
            UnmappedPolicy::Drop,
        );
        assert!(manifest.lines().any(|l| l == "streamlit"));

        let manifest = render_manifest("import requests", AppKind::Gradio, UnmappedPolicy::Drop);
        assert!(manifest.lines().any(|l| l == "gradio"));
        assert!(manifest.lines().any(|l| l == "requests"));
    }

    #[test]
    fn test_manifest_is_idempotent() {
        let first = render_manifest(SAMPLE, AppKind::Streamlit, UnmappedPolicy::Passthrough);
        let second = render_manifest(SAMPLE, AppKind::Streamlit, UnmappedPolicy::Passthrough);
        assert_eq!(first, second);

        let set: BTreeSet<&str> = first.lines().collect();
        assert_eq!(set.len(), first.lines().count(), "no duplicate lines");
    }

    #[test]
    fn test_unmapped_policy_passthrough_vs_drop() {
        let source = "import somethingobscure";

        let kept = render_manifest(source, AppKind::Streamlit, UnmappedPolicy::Passthrough);
        assert!(kept.lines().any(|l| l == "somethingobscure"));

        let dropped = render_manifest(source, AppKind::Streamlit, UnmappedPolicy::Drop);
        assert!(!dropped.lines().any(|l| l == "somethingobscure"));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "passthrough".parse::<UnmappedPolicy>().unwrap(),
            UnmappedPolicy::Passthrough
        );
        assert_eq!("drop".parse::<UnmappedPolicy>().unwrap(), UnmappedPolicy::Drop);
        assert!("ignore".parse::<UnmappedPolicy>().is_err());
    }

    #[test]
    fn test_relative_imports_ignored() {
        let imports = extract_imports("from . import helpers\nfrom .models import Thing");
        assert!(imports.is_empty());
    }
}
