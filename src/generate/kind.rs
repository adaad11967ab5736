//! The closed set of application kinds appforge can generate

use serde::{Deserialize, Serialize};
use std::fmt;

/// Application kind selected by the user
///
/// Drives the prompt template, the fence tag used for extraction, the
/// force-included UI package, and the process commands in the generated
/// boilerplate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppKind {
    Streamlit,
    Gradio,
    Dash,
}

impl AppKind {
    /// Language tag of the fenced block expected in the LLM reply
    pub fn fence_tag(&self) -> &'static str {
        // All supported kinds generate Python source
        "python"
    }

    /// Package that must always appear in the dependency manifest, whether
    /// or not the generated source imports it, so the deployed artifact can
    /// start
    pub fn ui_package(&self) -> &'static str {
        match self {
            AppKind::Streamlit => "streamlit",
            AppKind::Gradio => "gradio",
            AppKind::Dash => "dash",
        }
    }

    /// Process command for the Procfile and entry script
    pub fn run_command(&self) -> &'static str {
        match self {
            AppKind::Streamlit => {
                "streamlit run app.py --server.port=${PORT} --server.address=0.0.0.0"
            }
            AppKind::Gradio | AppKind::Dash => "python app.py",
        }
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AppKind::Streamlit => "Streamlit",
            AppKind::Gradio => "Gradio",
            AppKind::Dash => "Dash",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fence_tag_is_python() {
        for kind in [AppKind::Streamlit, AppKind::Gradio, AppKind::Dash] {
            assert_eq!(kind.fence_tag(), "python");
        }
    }

    #[test]
    fn test_ui_packages() {
        assert_eq!(AppKind::Streamlit.ui_package(), "streamlit");
        assert_eq!(AppKind::Gradio.ui_package(), "gradio");
        assert_eq!(AppKind::Dash.ui_package(), "dash");
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_string(&AppKind::Streamlit).unwrap();
        assert_eq!(json, "\"streamlit\"");
        let kind: AppKind = serde_json::from_str(&json).unwrap();
        assert_eq!(kind, AppKind::Streamlit);
    }
}
