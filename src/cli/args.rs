//! Command-line argument model

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::config::ConfigArgs;
use crate::cli::commands::ls::LsArgs;
use crate::cli::commands::show::ShowArgs;

/// Command line client for Targetprocess
#[derive(Parser, Debug)]
#[command(
    name = "tp",
    author,
    version,
    about = "List and show Targetprocess entities from the command line",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Configuration file read after all other files
    #[arg(long, short = 'c', global = true, env = "TP_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log debug messages to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List entities matching a filter
    Ls(LsArgs),

    /// Show a single entity
    Show(ShowArgs),

    /// Print the effective options of a command
    Config(ConfigArgs),

    /// Generate a shell completion script
    Completions(CompletionsArgs),
}

/// `--pager` / `--no-pager`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PagerArgs {
    /// Page the output
    #[arg(long, short = 'p', overrides_with = "no_pager")]
    pub pager: bool,

    /// Never page the output
    #[arg(long, overrides_with = "pager")]
    pub no_pager: bool,
}

impl PagerArgs {
    /// The requested pager setting, if any flag was given
    pub fn value(&self) -> Option<bool> {
        match (self.pager, self.no_pager) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_pager_flags() {
        let cli = Cli::parse_from(["tp", "ls", "--pager", "--no-pager"]);
        let Commands::Ls(args) = cli.command else {
            panic!("expected ls");
        };
        assert_eq!(args.pager.value(), Some(false));

        let cli = Cli::parse_from(["tp", "ls", "bug", "state=open"]);
        let Commands::Ls(args) = cli.command else {
            panic!("expected ls");
        };
        assert_eq!(args.pager.value(), None);
        assert_eq!(args.filter, vec!["bug", "state=open"]);
    }
}
