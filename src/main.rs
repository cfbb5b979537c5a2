use clap::Parser;
use intraday_levels::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
