//! docclass CLI binary.

use std::process;

use clap::Parser;
use docclass::cli::{DocclassArgs, execute_command, init_tracing};

fn main() {
    let args = DocclassArgs::parse();

    init_tracing(args.verbosity());

    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
