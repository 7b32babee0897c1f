//! CLI command implementations

pub mod completions;
pub mod config;
pub mod ls;
pub mod show;

use miette::Diagnostic;
use thiserror::Error;

use crate::api::ApiError;
use crate::cli::{Cli, Commands, GlobalOpts};
use crate::core::config::{ConfigError, FileConfig};
use crate::core::logging::{self, LogSettings};

/// Exit status for configuration errors and usage errors
pub const EXIT_CONFIG: i32 = 2;

/// Exit status for remote and I/O failures
pub const EXIT_FAILURE: i32 = 1;

#[derive(Debug, Error, Diagnostic)]
pub enum CommandError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Api(#[from] ApiError),

    #[error("Cannot write output: {0}")]
    #[diagnostic(code(tp::io))]
    Io(#[from] std::io::Error),

    #[error("Cannot encode JSON: {0}")]
    #[diagnostic(code(tp::json))]
    Json(#[from] serde_json::Error),
}

impl CommandError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::Config(_) => EXIT_CONFIG,
            _ => EXIT_FAILURE,
        }
    }
}

/// Run the parsed command line
pub fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Ls(args) => ls::run(args, &cli.global),
        Commands::Show(args) => show::run(args, &cli.global),
        Commands::Config(args) => config::run(args, &cli.global),
        Commands::Completions(args) => completions::run(args),
    }
}

/// Read every configuration file and start logging
pub fn load_config(global: &GlobalOpts) -> Result<FileConfig, CommandError> {
    let files = FileConfig::load(global.config.as_deref())?;
    logging::init(&LogSettings::from_config(&files)?, global.verbose);
    Ok(files)
}
