use clap::Parser;
use std::process::ExitCode;

use retouch::cli::{self, CliArgs};
use retouch::logger;

fn main() -> ExitCode {
    // Initialize session log (overwrites previous session log)
    logger::init();

    let args = CliArgs::parse();
    cli::run(args)
}
