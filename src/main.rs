//! `update-manifest`: regenerate the browser projects of a repo manifest.

use colored::Colorize;
use std::process::ExitCode;

fn main() -> ExitCode {
    match manifest_sync::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
