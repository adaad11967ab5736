//! Prompts for application generation

use crate::generate::composer::GenerationRequest;

/// System prompt for all generation requests
pub const SYSTEM_PROMPT: &str = r#"You are an expert Python application developer. You turn short product ideas into complete, working single-file applications.

IMPORTANT GUIDELINES:
1. Respond with EXACTLY ONE fenced code block tagged with the language, containing the entire application
2. The application must be self-contained in a single file named app.py
3. Read any secrets or configuration from environment variables, never hardcode credentials
4. Use only widely available packages installable from PyPI
5. Do not include explanations outside the code block"#;

/// Builds user prompts embedding the idea and kind-specific constraints
pub struct PromptBuilder;

impl PromptBuilder {
    /// Builds the user message for a generation request
    pub fn build_generation_prompt(request: &GenerationRequest) -> String {
        let kind = request.kind;
        format!(
            "Generate a {kind} app for the following idea:\n{idea}\n\n\
             Technical constraints:\n\
             - Single file, app.py, runnable with `{run}`\n\
             - The UI must be built with the {package} package\n\
             - Bind to the port given by the PORT environment variable where applicable\n\
             - Respond with exactly one fenced ```{tag} code block and nothing else",
            kind = kind,
            idea = request.idea,
            run = kind.run_command(),
            package = kind.ui_package(),
            tag = kind.fence_tag(),
        )
    }
}
