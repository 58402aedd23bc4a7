//! `shelpers` binary entry point.

use anyhow::Result;
use clap::Parser;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use shelpers_cli::{cli, commands, logging};

fn main() -> Result<ExitCode> {
    let args = cli::Cli::parse();
    let command = match &args.command {
        cli::Command::Install(_) => "install",
        cli::Command::Trash(_) => "trash",
        cli::Command::Version => "version",
    };
    logging::init_subscriber(args.verbose, command);
    let log = Arc::new(logging::Logger::new(command));

    match args.command {
        cli::Command::Install(opts) => {
            commands::install::run(&args.global, &opts, &log)?;
            Ok(ExitCode::SUCCESS)
        }
        cli::Command::Trash(opts) => commands::trash::run(&opts, &log),
        cli::Command::Version => {
            commands::version::run(io::stdout().lock())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
