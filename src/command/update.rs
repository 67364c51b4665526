use crate::config::UpdateConfig;
use crate::deps::DepsFileReader;
use crate::error::Result;
use crate::logging::{self, LogConfig};
use crate::ops::{ManifestUpdate, UpdateOutcome};
use crate::validation::{check_source_root, find_checkout_root, parse_test_root};
use crate::vcs::{CommandRunner, GitPublisher, RepoCheckout, get_source};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Arguments for an update run.
#[derive(Parser, Debug, Clone)]
pub struct UpdateArgs {
    /// Directory where the trial checkouts are stored
    #[arg(short = 'r', long, value_name = "DIR", value_parser = parse_test_root)]
    pub testroot: PathBuf,

    /// Actually push manifest changes (otherwise the push is a dry run)
    #[arg(short, long)]
    pub force: bool,

    /// Run with debug output, including output of external commands
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of parallel fetch jobs for trial syncs
    #[arg(short, long, value_name = "N", default_value_t = 12)]
    pub jobs: usize,

    /// Root of the repo checkout holding the browser sources
    /// (searches upward from the current directory if not specified)
    #[arg(long, value_name = "DIR")]
    pub checkout_root: Option<PathBuf>,

    /// Where manifest repositories are cloned (defaults to the system temp dir)
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,
}

impl UpdateArgs {
    /// Builds the run configuration. A relative `--work-dir` is resolved
    /// against the current directory, since git later runs inside it.
    pub fn to_config(&self) -> Result<UpdateConfig> {
        let mut config = UpdateConfig {
            jobs: self.jobs,
            ..UpdateConfig::default()
        };
        if let Some(dir) = &self.work_dir {
            config.work_dir = std::path::absolute(dir)?;
        }
        Ok(config)
    }
}

/// Runs the periodic manifest update.
///
/// ## Phases
///
/// 1. Locate the checkout and confirm the browser sources exist
/// 2. Clone or fast-forward both manifest repositories
/// 3. `repo sync` the browser source projects so DEPS files are current
/// 4. Update the external manifest, then the internal one
///
/// Each manifest update stops quietly when nothing changed. Any error aborts
/// the whole run.
pub fn execute(args: UpdateArgs) -> Result<()> {
    let log_config = LogConfig::from_verbose(args.verbose);
    logging::init(&log_config);

    let config = args.to_config()?;
    let dry_run = !args.force;

    let checkout_root = match &args.checkout_root {
        Some(root) => std::path::absolute(root)?,
        None => find_checkout_root(&std::env::current_dir()?)?,
    };
    check_source_root(&checkout_root, &config)?;
    log::debug!("Checkout root: {}", checkout_root.display());
    log::debug!("Test root: {}", args.testroot.display());

    let runner = CommandRunner::new(log_config);

    let external_git = get_source(
        runner,
        &config.manifest_checkout(false),
        &config.gerrit_url,
        &config.external_manifest_project,
    )?;
    let internal_git = get_source(
        runner,
        &config.manifest_checkout(true),
        &config.gerrit_internal_url,
        &config.internal_manifest_project,
    )?;

    RepoCheckout::new(runner, &checkout_root, config.manifest_url.clone())
        .sync_projects(&config.source_projects())?;

    for (internal, git) in [(false, external_git), (true, internal_git)] {
        let manifest_path = git.dir().join(&config.manifest_file_name);
        let publisher = GitPublisher::new(git, &config, dry_run);
        let outcome = update_manifest(
            &config,
            runner,
            &checkout_root,
            &args.testroot,
            manifest_path.clone(),
            internal,
            &publisher,
        )?;
        report(&manifest_path, outcome);
    }

    Ok(())
}

fn update_manifest(
    config: &UpdateConfig,
    runner: CommandRunner,
    checkout_root: &Path,
    test_root: &Path,
    manifest_path: PathBuf,
    internal: bool,
    publisher: &GitPublisher,
) -> Result<UpdateOutcome> {
    let manifest_url = if internal {
        &config.manifest_internal_url
    } else {
        &config.manifest_url
    };
    let trial = RepoCheckout::new(
        runner,
        config.test_dir(test_root, internal),
        manifest_url.clone(),
    );

    let deps = DepsFileReader;
    ManifestUpdate::new(
        config,
        checkout_root,
        manifest_path,
        internal,
        &deps,
        &trial,
        publisher,
    )
    .perform_update()
}

fn report(manifest_path: &Path, outcome: UpdateOutcome) {
    let name = manifest_path.display().to_string();
    match outcome {
        UpdateOutcome::Unchanged => {
            println!("{} {}", "✓ Up to date:".green(), name.dimmed());
        }
        UpdateOutcome::Published { dry_run: true } => {
            println!(
                "{} {} {}",
                "✓ Committed".yellow().bold(),
                name,
                "(dry run, pass --force to push)".dimmed()
            );
        }
        UpdateOutcome::Published { dry_run: false } => {
            println!("{} {}", "✓ Pushed".green().bold(), name);
        }
    }
}
