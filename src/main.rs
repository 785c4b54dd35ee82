//! Sprout CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use sprout::cli::{Cli, CommandDispatcher, Commands};
use sprout::shell::is_ci;
use sprout::ui::{create_ui, OutputMode, UserInterface};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logs go to stderr. `--debug` wins over `RUST_LOG`; the default is info.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("sprout=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sprout=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Prompts need an attended terminal outside CI, and no `--non-interactive`.
fn can_prompt(cli: &Cli) -> bool {
    let opted_out = matches!(&cli.command, Commands::Create(args) if args.non_interactive);
    console::user_attended() && !is_ci() && !opted_out
}

fn run(cli: &Cli, ui: &mut dyn UserInterface) -> anyhow::Result<ExitCode> {
    let working_dir = std::env::current_dir()
        .map_err(|e| anyhow::anyhow!("cannot read current directory: {}", e))?;

    let result = CommandDispatcher::from_cli(cli, working_dir).dispatch(cli, ui)?;
    Ok(ExitCode::from(u8::try_from(result.exit_code).unwrap_or(1)))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    tracing::debug!(?cli, "Parsed arguments");

    let mode = OutputMode::from_flags(cli.verbose, cli.quiet);
    let mut ui = create_ui(can_prompt(&cli), mode, !cli.no_color);

    match run(&cli, ui.as_mut()) {
        Ok(code) => code,
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}
