use crate::command::UpdateArgs;
use clap::Parser;

/// Sync the repo manifest's browser projects with .DEPS.git.
///
/// Designed to be run periodically from a host machine.
#[derive(Parser)]
#[command(name = "update-manifest", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub update: UpdateArgs,
}
