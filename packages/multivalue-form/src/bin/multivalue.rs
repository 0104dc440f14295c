//! `multivalue` command-line entry point.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::Parser;
use multivalue_form::cli::{run, Cli};
use multivalue_form::logging::init_logging;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_config = cli.log_config().with_ansi(io::stderr().is_terminal());
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
