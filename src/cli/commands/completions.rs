//! `tp completions` command - print a shell completion script

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::commands::CommandError;
use crate::cli::Cli;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate the script for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Run the completions command
pub fn run(args: CompletionsArgs) -> Result<(), CommandError> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    generate(args.shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
