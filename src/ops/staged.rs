//! The pending manifest and its live counterpart.
//!
//! The regenerated document is written next to the live manifest and only
//! moved over it once every check has passed. Until then both files coexist
//! on disk; a run that stops early leaves the staged file behind for
//! inspection and the live one untouched.

use crate::error::{Result, UpdateError};
use std::fs;
use std::path::{Path, PathBuf};

#[must_use = "StagedManifest must be committed or left for inspection"]
#[derive(Debug)]
pub struct StagedManifest {
    live: PathBuf,
    staged: PathBuf,
    committed: bool,
}

impl StagedManifest {
    pub fn new(live: PathBuf, staged: PathBuf) -> Self {
        Self {
            live,
            staged,
            committed: false,
        }
    }

    /// Stages next to `live` under `staged_name`.
    pub fn beside(live: PathBuf, staged_name: &str) -> Self {
        let staged = live
            .parent()
            .map_or_else(|| PathBuf::from(staged_name), |dir| dir.join(staged_name));
        Self::new(live, staged)
    }

    pub fn live_path(&self) -> &Path {
        &self.live
    }

    pub fn staged_path(&self) -> &Path {
        &self.staged
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub fn read_live(&self) -> Result<String> {
        fs::read_to_string(&self.live).map_err(|e| {
            log::error!("Failed to read manifest {}: {}", self.live.display(), e);
            UpdateError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read {}: {}", self.live.display(), e),
            ))
        })
    }

    /// Writes the pending document, replacing any earlier staged copy.
    pub fn write(&self, content: &str) -> Result<()> {
        fs::write(&self.staged, content).map_err(|e| {
            UpdateError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write {}: {}", self.staged.display(), e),
            ))
        })?;
        log::debug!("Staged new manifest at {}", self.staged.display());
        Ok(())
    }

    /// Byte-for-byte comparison of the staged and live files.
    pub fn differs(&self) -> Result<bool> {
        is_different(&self.staged, &self.live)
    }

    /// Moves the staged file over the live manifest.
    pub fn commit(&mut self) -> Result<()> {
        if self.committed {
            return Err(UpdateError::Other(anyhow::anyhow!(
                "Staged manifest already committed"
            )));
        }

        fs::rename(&self.staged, &self.live).map_err(|e| {
            UpdateError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to move {} to {}: {}",
                    self.staged.display(),
                    self.live.display(),
                    e
                ),
            ))
        })?;

        log::info!("Replaced {}", self.live.display());
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedManifest {
    fn drop(&mut self) {
        if !self.committed && self.staged.exists() {
            log::debug!(
                "Staged manifest left at {} (live manifest unchanged)",
                self.staged.display()
            );
        }
    }
}

/// Returns `true` unless both files hold exactly the same bytes.
///
/// No normalisation of whitespace or attribute order; generation is
/// deterministic so any difference is a real one.
pub fn is_different(a: &Path, b: &Path) -> Result<bool> {
    if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
        return Ok(true);
    }
    Ok(fs::read(a)? != fs::read(b)?)
}
