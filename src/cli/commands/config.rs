//! `tp config` command - show the effective options of a command

use console::{pad_str, style, Alignment};

use crate::cli::commands::{load_config, CommandError};
use crate::cli::output;
use crate::cli::GlobalOpts;
use crate::core::config::{EffectiveOptions, FileConfig, Overrides};

#[derive(clap::Args, Debug)]
pub struct ConfigArgs {
    /// Command or template section, e.g. `ls`, `show` or `ls.mine`
    #[arg(default_value = "ls")]
    pub command: String,

    /// Override any option, as the other commands do
    #[arg(long = "set", value_name = "OPTION=VALUE")]
    pub set: Vec<String>,
}

/// Describe the files read and every resolved option with its origin
pub fn describe(options: &EffectiveOptions, files: &FileConfig) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", style("Files read:").bold()));
    if files.files().is_empty() {
        out.push_str("  none (built-in defaults only)\n");
    }
    for path in files.files() {
        out.push_str(&format!("  {}\n", path.display()));
    }

    out.push_str(&format!("\n{}\n", style(format!("[{}]", options.command)).bold()));
    let width = options
        .resolved()
        .iter()
        .map(|option| option.name.len())
        .max()
        .unwrap_or_default();
    for option in options.resolved() {
        let line = format!(
            "  {} = {}",
            pad_str(option.name, width, Alignment::Left, None),
            option.raw
        );
        out.push_str(&format!(
            "{}  {}\n",
            line.trim_end(),
            style(format!("# {}", option.origin)).dim()
        ));
    }

    let root = options.command.split('.').next().unwrap_or_default();
    let mut templates = files.templates(root);
    if !templates.is_empty() {
        templates.sort();
        out.push_str(&format!("\nTemplates: {}\n", templates.join(", ")));
    }

    out
}

/// Run the config command
pub fn run(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CommandError> {
    let files = load_config(global)?;
    let overrides = Overrides::new().assignments(&args.set)?;
    let options = EffectiveOptions::resolve(&args.command, &overrides, &files)?;

    output::print(&describe(&options, &files))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let mut files = FileConfig::builtin().unwrap();
        files.merge(FileConfig::from_ini("[ls.mine]\nnumber = 5\n", "test.conf").unwrap());
        let options =
            EffectiveOptions::resolve("ls.mine", &Overrides::new().set("sort", "Name"), &files)
                .unwrap();

        let text = describe(&options, &files);
        assert!(text.contains("none (built-in defaults only)"));
        assert!(text.contains("[ls.mine]"));
        assert!(text.contains("  number   = 5"));
        assert!(text.contains("# [ls.mine]"));
        assert!(text.contains("# the command line"));
        assert!(text.contains("Templates: mine"));
    }
}
