//! Error types for manifest-sync.
//!
//! All operations return `Result<T>` which aliases `Result<T, UpdateError>`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from manifest update operations.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The autogenerated region could not be located.
    ///
    /// Fatal: there is no safe region to replace.
    #[error("Chromium projects begin/end markers not found!")]
    MarkersNotFound,

    /// A project outside the managed namespace sits inside the region
    /// that is about to be regenerated.
    #[error("Project {0} was about to be accidentally removed!")]
    ProjectAboutToBeRemoved(String),

    /// Manifest XML could not be parsed.
    #[error("Manifest XML error: {0}")]
    Xml(String),

    /// The trial checkout against the staged manifest failed.
    #[error("Failed to sync with new manifest: {0}")]
    TrialSyncFailed(String),

    /// Invalid `--testroot` value.
    #[error("Invalid test root '{0}'")]
    InvalidTestRoot(String),

    /// No `.repo` checkout found above the starting directory.
    #[error("Repo checkout root not found (searched upward from {0})")]
    CheckoutRootNotFound(PathBuf),

    /// The browser source directory is missing from the checkout.
    #[error("chromium src/ dir not found: {0}")]
    SourceDirNotFound(PathBuf),

    /// An external tool exited unsuccessfully.
    #[error("Command `{command}` failed ({status}){}", format_stderr(.stderr))]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// A dependency-pinning file could not be interpreted.
    #[error("Failed to parse {}: {message}", path.display())]
    DepsParse { path: PathBuf, message: String },

    /// File system operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Regex compilation failed (indicates bug).
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Unexpected error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl UpdateError {
    /// Returns `true` for failures of the manifest transformation itself,
    /// as opposed to configuration or external tool failures.
    pub fn is_manifest_error(&self) -> bool {
        matches!(
            self,
            UpdateError::MarkersNotFound
                | UpdateError::ProjectAboutToBeRemoved(_)
                | UpdateError::Xml(_)
        )
    }
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

/// Result type alias for manifest-sync operations.
pub type Result<T> = std::result::Result<T, UpdateError>;
