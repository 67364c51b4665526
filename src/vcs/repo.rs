use crate::error::{Result, UpdateError};
use crate::vcs::process::CommandRunner;
use crate::vcs::{ManifestOverride, TrialCheckout};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_MANIFEST: &str = "default.xml";

/// A `repo` checkout.
#[derive(Debug, Clone)]
pub struct RepoCheckout {
    runner: CommandRunner,
    dir: PathBuf,
    manifest_url: String,
}

impl RepoCheckout {
    pub fn new(
        runner: CommandRunner,
        dir: impl Into<PathBuf>,
        manifest_url: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            dir: dir.into(),
            manifest_url: manifest_url.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn repo_dir(&self) -> PathBuf {
        self.dir.join(".repo")
    }

    pub fn is_initialized(&self) -> bool {
        self.repo_dir().is_dir()
    }

    /// Creates the checkout directory and runs `repo init` if needed.
    pub fn initialize(&self) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }
        fs::create_dir_all(&self.dir)?;
        log::info!(
            "Initializing checkout in {} from {}",
            self.dir.display(),
            self.manifest_url
        );
        self.runner
            .run("repo", &["init", "-u", &self.manifest_url], Some(&self.dir))
            .map(drop)
    }

    /// Points `.repo/manifest.xml` at the requested manifest.
    fn select_manifest(&self, manifest: &ManifestOverride) -> Result<()> {
        match manifest {
            ManifestOverride::Local(path) => {
                let target = self.repo_dir().join("manifest.xml");
                if target.symlink_metadata().is_ok() {
                    fs::remove_file(&target)?;
                }
                fs::copy(path, &target).map_err(|e| {
                    UpdateError::Io(std::io::Error::new(
                        e.kind(),
                        format!("Failed to copy {} to {}: {}", path.display(), target.display(), e),
                    ))
                })?;
                Ok(())
            }
            ManifestOverride::Default => self
                .runner
                .run(
                    "repo",
                    &["init", "-u", &self.manifest_url, "-m", DEFAULT_MANIFEST],
                    Some(&self.dir),
                )
                .map(drop),
        }
    }

    /// Syncs only the named projects.
    pub fn sync_projects(&self, projects: &[String]) -> Result<()> {
        let mut args = vec!["sync"];
        args.extend(projects.iter().map(String::as_str));
        self.runner.run("repo", &args, Some(&self.dir)).map(drop)
    }
}

impl TrialCheckout for RepoCheckout {
    fn sync(&self, manifest: &ManifestOverride, jobs: usize) -> Result<()> {
        self.initialize()?;
        self.select_manifest(manifest)?;
        let jobs = jobs.max(1).to_string();
        self.runner
            .run("repo", &["sync", "--jobs", &jobs], Some(&self.dir))
            .map(drop)
    }
}
