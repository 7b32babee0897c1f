use clap::Parser;
use tp::cli::commands;
use tp::cli::Cli;

fn main() {
    // Install miette's fancy error handler for beautiful diagnostics
    let _ = miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }));

    let cli = Cli::parse();

    if let Err(err) = commands::run(cli) {
        let code = err.exit_code();
        tracing::error!("{}", err);
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
