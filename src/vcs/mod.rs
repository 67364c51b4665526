//! External tools: `git` for the manifest repositories and `repo` for
//! checkouts.
//!
//! The update logic only sees the two traits below, so it can run against
//! recording doubles in tests.

pub mod git;
pub mod process;
pub mod repo;

use crate::error::Result;
use std::path::{Path, PathBuf};

pub use git::{Git, GitPublisher, get_source};
pub use process::CommandRunner;
pub use repo::RepoCheckout;

/// Which manifest a checkout should be synced against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestOverride {
    /// A manifest file outside the manifest repository.
    Local(PathBuf),
    /// The checkout's own default manifest.
    Default,
}

/// A scratch checkout used to prove a manifest actually syncs.
pub trait TrialCheckout {
    fn sync(&self, manifest: &ManifestOverride, jobs: usize) -> Result<()>;
}

/// Commits and pushes a manifest repository.
pub trait ManifestPublisher {
    /// Puts the repository on a fresh branch ready to take a commit.
    fn prepare(&self) -> Result<()>;

    /// Records the already-replaced manifest and pushes it upstream.
    fn publish(&self, manifest: &Path) -> Result<()>;

    /// `true` when pushes are only rehearsed.
    fn dry_run(&self) -> bool;
}
