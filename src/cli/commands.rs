use crate::generate::kind::AppKind;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Turn an app idea into generated source, a published repository, and a
/// live container deployment
#[derive(Parser, Debug)]
#[command(
    name = "appforge",
    about = "Turn an app idea into generated source, a published repository, and a live deployment",
    version,
    author,
    long_about = "appforge sends your idea to an LLM, extracts the generated application, \
                  publishes it to a source repository with a container build setup, \
                  provisions the platform secret, and deploys it, tracking every attempt \
                  in an external ledger."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Increase verbosity"
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Generate application source without deploying",
        long_about = "Sends the idea to the LLM, extracts the generated source, and infers \
                      its dependency manifest.\n\n\
                      Examples:\n  \
                      appforge generate \"a todo list app\"\n  \
                      appforge generate \"a mood tracker\" --kind gradio\n  \
                      appforge generate \"a todo list app\" --format json -o app.json"
    )]
    Generate(GenerateArgs),

    #[command(
        about = "Generate, publish, and deploy an application",
        long_about = "Runs the full workflow: generation, ledger insert, repository \
                      publishing, secret provisioning, platform deployment with release \
                      polling, and ledger completion.\n\n\
                      Examples:\n  \
                      appforge deploy \"a todo list app\"\n  \
                      appforge deploy \"a crm\" --repo-name my-crm --pitch-deck"
    )]
    Deploy(DeployArgs),

    #[command(
        about = "Look up auxiliary artifact links for a deployment",
        long_about = "Queries the ledger row for the given identifier and prints the \
                      pitch-deck / document URLs once the automation has produced them.\n\n\
                      Examples:\n  \
                      appforge artifacts 4f7c...-uuid"
    )]
    Artifacts(ArtifactsArgs),

    #[command(
        about = "Check connectivity and credentials for each service",
        long_about = "Verifies the LLM endpoint, source host, platform, and ledger with \
                      lightweight authenticated calls.\n\n\
                      Examples:\n  \
                      appforge health\n  \
                      appforge health --format json"
    )]
    Health(HealthArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(value_name = "IDEA", help = "Free-text description of the app to build")]
    pub idea: String,

    #[arg(
        short = 'k',
        long,
        value_enum,
        default_value = "streamlit",
        help = "Application kind"
    )]
    pub kind: AppKindArg,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeployArgs {
    #[arg(value_name = "IDEA", help = "Free-text description of the app to build")]
    pub idea: String,

    #[arg(
        short = 'k',
        long,
        value_enum,
        default_value = "streamlit",
        help = "Application kind"
    )]
    pub kind: AppKindArg,

    #[arg(
        short = 'r',
        long,
        value_name = "NAME",
        help = "Repository name (defaults to the configured name, uniquified on collision)"
    )]
    pub repo_name: Option<String>,

    #[arg(long, help = "Ask the automation for a pitch deck")]
    pub pitch_deck: bool,

    #[arg(long, help = "Ask the automation for a one-pager document")]
    pub document: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ArtifactsArgs {
    #[arg(value_name = "ID", help = "Deployment identifier printed by `deploy`")]
    pub unique_id: String,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct HealthArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppKindArg {
    Streamlit,
    Gradio,
    Dash,
}

impl From<AppKindArg> for AppKind {
    fn from(arg: AppKindArg) -> Self {
        match arg {
            AppKindArg::Streamlit => AppKind::Streamlit,
            AppKindArg::Gradio => AppKind::Gradio,
            AppKindArg::Dash => AppKind::Dash,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate() {
        let args = CliArgs::parse_from(["appforge", "generate", "a todo list app"]);
        match args.command {
            Commands::Generate(g) => {
                assert_eq!(g.idea, "a todo list app");
                assert_eq!(g.kind, AppKindArg::Streamlit);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_parse_deploy_with_flags() {
        let args = CliArgs::parse_from([
            "appforge",
            "deploy",
            "a crm",
            "--repo-name",
            "my-crm",
            "--pitch-deck",
            "-k",
            "gradio",
        ]);
        match args.command {
            Commands::Deploy(d) => {
                assert_eq!(d.repo_name.as_deref(), Some("my-crm"));
                assert!(d.pitch_deck);
                assert!(!d.document);
                assert_eq!(d.kind, AppKindArg::Gradio);
            }
            _ => panic!("expected deploy"),
        }
    }

    #[test]
    fn test_verbose_quiet_conflict() {
        let result = CliArgs::try_parse_from(["appforge", "-v", "-q", "health"]);
        assert!(result.is_err());
    }
}
