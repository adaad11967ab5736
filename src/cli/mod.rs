pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{ArtifactsArgs, CliArgs, Commands, DeployArgs, GenerateArgs, HealthArgs};
pub use output::{OutputFormat, OutputFormatter};
