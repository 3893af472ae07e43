//! Cascade CLI - hierarchical task management with cascading completion

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = cascade_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
