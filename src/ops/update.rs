//! One manifest update, from regeneration to publication.
//!
//! ```text
//! Pending ─▶ Generated ─▶ Validated ─┬─▶ Unchanged
//!                                    └─▶ TrialSynced ─▶ Published
//!    (any failure) ─▶ Aborted
//! ```

use crate::config::UpdateConfig;
use crate::deps::DepsReader;
use crate::error::{Result, UpdateError};
use crate::manifest::{ManifestBuilder, Partition, parse_projects};
use crate::ops::staged::StagedManifest;
use crate::vcs::{ManifestOverride, ManifestPublisher, TrialCheckout};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    Pending,
    /// New document built and staged; the region it replaces passed the
    /// safety check.
    Generated,
    /// Staged document re-read and confirmed to be a well-formed manifest.
    Validated,
    /// Staged document matches the live one; nothing to do.
    Unchanged,
    /// A scratch checkout synced cleanly against the staged document.
    TrialSynced,
    Published,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Unchanged,
    Published { dry_run: bool },
}

/// External and internal manifests each get their own `ManifestUpdate`.
pub struct ManifestUpdate<'a> {
    config: &'a UpdateConfig,
    checkout_root: &'a Path,
    internal: bool,
    deps: &'a dyn DepsReader,
    checkout: &'a dyn TrialCheckout,
    publisher: &'a dyn ManifestPublisher,
    staged: StagedManifest,
    state: UpdateState,
}

impl<'a> ManifestUpdate<'a> {
    pub fn new(
        config: &'a UpdateConfig,
        checkout_root: &'a Path,
        manifest_path: PathBuf,
        internal: bool,
        deps: &'a dyn DepsReader,
        checkout: &'a dyn TrialCheckout,
        publisher: &'a dyn ManifestPublisher,
    ) -> Self {
        Self {
            config,
            checkout_root,
            internal,
            deps,
            checkout,
            publisher,
            staged: StagedManifest::beside(manifest_path, &config.staged_file_name),
            state: UpdateState::Pending,
        }
    }

    pub fn state(&self) -> UpdateState {
        self.state
    }

    pub fn staged_path(&self) -> &Path {
        self.staged.staged_path()
    }

    /// Runs the whole update.
    ///
    /// The live manifest is only replaced after the trial checkout succeeds;
    /// every earlier failure leaves it as it was.
    pub fn perform_update(&mut self) -> Result<UpdateOutcome> {
        let result = self.run();
        if let Err(e) = &result {
            self.state = UpdateState::Aborted;
            if e.is_manifest_error() {
                log::error!("Errors encountered while updating manifest!");
            }
        }
        result
    }

    fn run(&mut self) -> Result<UpdateOutcome> {
        self.publisher.prepare()?;

        self.create_new_manifest()?;
        self.transition(UpdateState::Generated);

        self.validate_new_manifest()?;
        self.transition(UpdateState::Validated);

        if !self.is_new_manifest_different()? {
            log::info!("{} is up to date", self.staged.live_path().display());
            self.transition(UpdateState::Unchanged);
            return Ok(UpdateOutcome::Unchanged);
        }

        self.test_new_manifest()?;
        self.transition(UpdateState::TrialSynced);

        self.push_changes()?;
        self.transition(UpdateState::Published);

        Ok(UpdateOutcome::Published {
            dry_run: self.publisher.dry_run(),
        })
    }

    fn transition(&mut self, next: UpdateState) {
        log::debug!("Manifest update: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Builds the new document and stages it beside the live manifest.
    pub fn create_new_manifest(&mut self) -> Result<()> {
        let live = self.staged.read_live()?;
        let builder =
            ManifestBuilder::new(self.config, self.checkout_root, self.internal, self.deps);
        let document = builder.build(&live)?;
        self.staged.write(&document)
    }

    fn validate_new_manifest(&self) -> Result<()> {
        let staged = std::fs::read_to_string(self.staged.staged_path())?;
        Partition::split(&staged)?;
        let projects = parse_projects(&staged)?;
        log::debug!("New manifest declares {} projects", projects.len());
        Ok(())
    }

    pub fn is_new_manifest_different(&self) -> Result<bool> {
        self.staged.differs()
    }

    /// Syncs a scratch checkout against the staged manifest, then back to
    /// its default manifest whatever the outcome.
    pub fn test_new_manifest(&self) -> Result<()> {
        let jobs = self.config.jobs;
        let trial = self.checkout.sync(
            &ManifestOverride::Local(self.staged.staged_path().to_path_buf()),
            jobs,
        );
        if trial.is_err() {
            log::error!("Failed to sync with new manifest!");
        }

        let revert = self.checkout.sync(&ManifestOverride::Default, jobs);

        match (trial, revert) {
            (Ok(()), Ok(())) => Ok(()),
            (Ok(()), Err(e)) => Err(e),
            (Err(e), revert) => {
                if let Err(revert_err) = revert {
                    log::error!("Failed to restore default manifest: {}", revert_err);
                }
                Err(UpdateError::TrialSyncFailed(e.to_string()))
            }
        }
    }

    fn push_changes(&mut self) -> Result<()> {
        self.staged.commit()?;
        self.publisher.publish(self.staged.live_path())
    }
}
