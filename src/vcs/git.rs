use crate::config::UpdateConfig;
use crate::error::Result;
use crate::vcs::ManifestPublisher;
use crate::vcs::process::CommandRunner;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

const REMOTE: &str = "origin";

/// A local git repository.
#[derive(Debug, Clone)]
pub struct Git {
    runner: CommandRunner,
    dir: PathBuf,
}

impl Git {
    pub fn open(runner: CommandRunner, dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            dir: dir.into(),
        }
    }

    pub fn clone_repo(runner: CommandRunner, url: &str, dest: &Path) -> Result<Self> {
        let dest_str = dest.to_string_lossy();
        runner.run("git", &["clone", url, &dest_str], None)?;
        Ok(Self::open(runner, dest))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        self.runner.run("git", args, Some(&self.dir))
    }

    pub fn pull_ff_only(&self) -> Result<()> {
        self.git(&["pull", "--ff-only"]).map(drop)
    }

    /// Resets `branch` to the remote's `upstream` and checks it out.
    pub fn checkout_fresh_branch(&self, branch: &str, upstream: &str) -> Result<()> {
        self.git(&["fetch", REMOTE])?;
        let start = format!("{}/{}", REMOTE, upstream);
        self.git(&["checkout", "--track", "-B", branch, &start])
            .map(drop)
    }

    /// Stages `path`, which may be given relative to the process or to the
    /// repository.
    pub fn add(&self, path: &Path) -> Result<()> {
        let path = repo_relative(&self.dir, path).to_string_lossy();
        self.git(&["add", &path]).map(drop)
    }

    pub fn commit(&self, message: &str) -> Result<()> {
        self.git(&["commit", "-m", message]).map(drop)
    }

    /// Rebases `branch` onto the latest upstream and pushes it, retrying on
    /// failure with a linearly growing delay.
    ///
    /// With `dry_run` the push goes through `--dry-run`: everything up to
    /// the network write is exercised.
    pub fn push_with_retry(
        &self,
        branch: &str,
        upstream: &str,
        retries: u32,
        retry_delay: Duration,
        dry_run: bool,
    ) -> Result<()> {
        let onto = format!("{}/{}", REMOTE, upstream);
        let refspec = format!("{}:{}", branch, upstream);
        let retries = retries.max(1);

        let mut attempt = 1;
        loop {
            let result = self
                .git(&["remote", "update"])
                .and_then(|_| self.git(&["rebase", &onto]))
                .and_then(|_| {
                    let mut args = vec!["push", REMOTE, refspec.as_str()];
                    if dry_run {
                        args.push("--dry-run");
                    }
                    self.git(&args)
                });

            match result {
                Ok(_) => {
                    log::info!(
                        "Pushed {} to {}{}",
                        branch,
                        onto,
                        if dry_run { " (dry run)" } else { "" }
                    );
                    return Ok(());
                }
                Err(e) if attempt >= retries => return Err(e),
                Err(e) => {
                    log::warn!(
                        "Error pushing changes, trying again ({}/{}): {}",
                        attempt,
                        retries,
                        e
                    );
                    thread::sleep(retry_delay * attempt);
                    attempt += 1;
                }
            }
        }
    }
}

/// `path` as git should see it when run inside `dir`.
///
/// Paths under `dir` are made relative to it, so a relative `dir` does not
/// get applied twice. Anything else is passed through.
fn repo_relative<'p>(dir: &Path, path: &'p Path) -> &'p Path {
    path.strip_prefix(dir).unwrap_or(path)
}

/// Makes sure an up-to-date clone of `project` exists at `dir`.
pub fn get_source(runner: CommandRunner, dir: &Path, url_base: &str, project: &str) -> Result<Git> {
    let git = if dir.is_dir() {
        Git::open(runner, dir)
    } else {
        let url = format!("{}/{}", url_base.trim_end_matches('/'), project);
        log::info!("Cloning {} into {}", url, dir.display());
        Git::clone_repo(runner, &url, dir)?
    };
    git.pull_ff_only()?;
    Ok(git)
}

/// Publishes manifest changes from a manifest repository clone.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    git: Git,
    branch: String,
    upstream: String,
    retries: u32,
    retry_delay: Duration,
    message: String,
    dry_run: bool,
}

impl GitPublisher {
    pub fn new(git: Git, config: &UpdateConfig, dry_run: bool) -> Self {
        Self {
            git,
            branch: config.push_branch.clone(),
            upstream: config.upstream_branch.clone(),
            retries: config.push_retries,
            retry_delay: Duration::from_secs(5),
            message: config.commit_message.clone(),
            dry_run,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

impl ManifestPublisher for GitPublisher {
    fn prepare(&self) -> Result<()> {
        log::debug!(
            "Preparing {} on branch {}",
            self.git.dir().display(),
            self.branch
        );
        self.git.checkout_fresh_branch(&self.branch, &self.upstream)
    }

    fn publish(&self, manifest: &Path) -> Result<()> {
        self.git.add(manifest)?;
        self.git.commit(&self.message)?;
        self.git.push_with_retry(
            &self.branch,
            &self.upstream,
            self.retries,
            self.retry_delay,
            self.dry_run,
        )
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_relative_strips_relative_checkout_dir() {
        let dir = Path::new("w/update-manifest");
        assert_eq!(
            repo_relative(dir, Path::new("w/update-manifest/oldlayout.xml")),
            Path::new("oldlayout.xml")
        );
    }

    #[test]
    fn test_repo_relative_strips_absolute_checkout_dir() {
        let dir = Path::new("/tmp/update-manifest");
        assert_eq!(
            repo_relative(dir, Path::new("/tmp/update-manifest/oldlayout.xml")),
            Path::new("oldlayout.xml")
        );
    }

    #[test]
    fn test_repo_relative_passes_other_paths_through() {
        let dir = Path::new("/tmp/update-manifest");
        assert_eq!(
            repo_relative(dir, Path::new("oldlayout.xml")),
            Path::new("oldlayout.xml")
        );
        assert_eq!(
            repo_relative(dir, Path::new("/elsewhere/oldlayout.xml")),
            Path::new("/elsewhere/oldlayout.xml")
        );
    }
}
