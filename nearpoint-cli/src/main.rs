use clap::Parser;
use nearpoint_cli::{commands, exit_code, exit_code_for, logging, Cli, RunConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    // clap prints usage errors itself and exits with code 2
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = RunConfig::from_cli(&cli)
        .map_err(anyhow::Error::from)
        .and_then(|config| commands::execute(&config, &mut std::io::stdout().lock()));

    match result {
        Ok(()) => ExitCode::from(exit_code::SUCCESS),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code_for(&err))
        }
    }
}
