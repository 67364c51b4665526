#![doc = include_str!("../README.md")]

pub mod cli;
pub mod command;
pub mod config;
pub mod deps;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod ops;
pub mod validation;
pub mod vcs;

pub use error::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() -> Result<()> {
    use clap::Parser;

    let cli = cli::Cli::parse();
    command::update::execute(cli.update)
}
