//! Fenced code block extraction from LLM replies

use crate::generate::kind::AppKind;
use crate::generate::GenerationError;
use regex::Regex;
use tracing::debug;

/// Extracts the first fenced code block tagged for the given kind
///
/// The interior of the block is returned verbatim, including blank lines.
/// A reply with no matching block is a typed failure, never an empty string.
///
/// # Errors
///
/// Returns `GenerationError::MissingCodeBlock` when no fenced block with the
/// kind's language tag is present.
pub fn extract_code_block(reply: &str, kind: AppKind) -> Result<String, GenerationError> {
    let tag = kind.fence_tag();
    let pattern = format!(r"(?s)```{}\n(.*?)\n```", regex::escape(tag));
    let re = Regex::new(&pattern).unwrap();

    match re.captures(reply).and_then(|caps| caps.get(1)) {
        Some(block) => {
            debug!(
                "Extracted {} byte fenced ```{} block",
                block.as_str().len(),
                tag
            );
            Ok(block.as_str().to_string())
        }
        None => Err(GenerationError::MissingCodeBlock { tag }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_interior_verbatim() {
        let source = "import streamlit as st\n\nst.title(\"Todo\")\n\nst.write(\"done\")";
        let reply = format!("Here is your app:\n```python\n{}\n```\nEnjoy!", source);

        let extracted = extract_code_block(&reply, AppKind::Streamlit).unwrap();
        assert_eq!(extracted, source);
    }

    #[test]
    fn test_preserves_blank_lines() {
        let reply = "```python\nline1\n\n\nline2\n```";
        let extracted = extract_code_block(reply, AppKind::Streamlit).unwrap();
        assert_eq!(extracted, "line1\n\n\nline2");
    }

    #[test]
    fn test_first_match_wins() {
        let reply = "```python\nfirst\n```\ntext\n```python\nsecond\n```";
        let extracted = extract_code_block(reply, AppKind::Streamlit).unwrap();
        assert_eq!(extracted, "first");
    }

    #[test]
    fn test_no_block_is_typed_failure() {
        let reply = "Sorry, I cannot help with that.";
        let result = extract_code_block(reply, AppKind::Streamlit);
        assert!(matches!(
            result,
            Err(GenerationError::MissingCodeBlock { tag: "python" })
        ));
    }

    #[test]
    fn test_untagged_fence_does_not_match() {
        let reply = "```\nprint('hi')\n```";
        let result = extract_code_block(reply, AppKind::Streamlit);
        assert!(result.is_err());
    }
}
