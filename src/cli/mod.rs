//! CLI module - argument parsing, command dispatch and output

pub mod args;
pub mod commands;
pub mod output;
pub mod table;

pub use args::{Cli, Commands, GlobalOpts, PagerArgs};
pub use commands::CommandError;
pub use table::{TableFormatter, TableStyle};
