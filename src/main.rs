use clap::Parser;
use std::process::ExitCode;
use tidysort::cli::{Cli, run_cli};
use tidysort::logging::init_logging;
use tidysort::output::OutputFormatter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&e);
            ExitCode::FAILURE
        }
    }
}
