//! Repository layout and remote locations used by an update run.

use std::path::{Path, PathBuf};

/// Root segment prepended to every dependency path in the manifest.
pub const CHROMIUM_ROOT: &str = "chromium";

/// Every project inside the autogenerated region must live under this prefix.
pub const NAMESPACE_PREFIX: &str = "chromium/";

/// Revision pinned on every generated entry.
pub const TRACKING_REVISION: &str = "refs/heads/master";

/// Settings for one invocation of the updater.
///
/// Defaults describe the standard Chromium OS layout; the command line only
/// overrides the handful of values that differ between hosts.
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    /// Checkout-relative browser source root.
    pub src_root: PathBuf,
    /// Checkout-relative private browser source root.
    pub src_internal_root: PathBuf,
    /// Dependency file name at the top of each source root.
    pub deps_file_name: String,
    /// Secondary dependency file, relative to `src_root`.
    pub cros_deps_file: PathBuf,

    /// Manifest file inside each manifest repository.
    pub manifest_file_name: String,
    /// Where the pending manifest is written, next to the live one.
    pub staged_file_name: String,

    pub external_manifest_project: String,
    pub internal_manifest_project: String,
    pub external_manifest_dir: String,
    pub internal_manifest_dir: String,

    /// Project checked out at `src_root`.
    pub src_project: String,
    /// Project checked out at `src_internal_root`.
    pub src_internal_project: String,

    pub gerrit_url: String,
    pub gerrit_internal_url: String,
    /// Manifest repositories used to initialise trial checkouts.
    pub manifest_url: String,
    pub manifest_internal_url: String,

    pub external_test_dir: String,
    pub internal_test_dir: String,

    /// Remote attribute written on private entries.
    pub internal_remote: String,

    pub push_branch: String,
    pub upstream_branch: String,
    pub push_retries: u32,
    pub commit_message: String,

    /// Worker count handed to the checkout tool for trial syncs.
    pub jobs: usize,

    /// Directory that receives the manifest repository clones.
    pub work_dir: PathBuf,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            src_root: Path::new(CHROMIUM_ROOT).join("src"),
            src_internal_root: Path::new(CHROMIUM_ROOT).join("src-internal"),
            deps_file_name: ".DEPS.git".to_string(),
            cros_deps_file: PathBuf::from("tools/cros.DEPS/DEPS"),
            manifest_file_name: "oldlayout.xml".to_string(),
            staged_file_name: "new_update_manifest.xml".to_string(),
            external_manifest_project: "chromiumos/manifest".to_string(),
            internal_manifest_project: "chromeos/manifest-internal".to_string(),
            external_manifest_dir: "update-manifest".to_string(),
            internal_manifest_dir: "update-manifest-internal".to_string(),
            src_project: "chromium/src".to_string(),
            src_internal_project: "chrome/src-internal".to_string(),
            gerrit_url: "ssh://gerrit.chromium.org:29418".to_string(),
            gerrit_internal_url: "ssh://gerrit-int.chromium.org:29419".to_string(),
            manifest_url: "https://git.chromium.org/git/chromiumos/manifest".to_string(),
            manifest_internal_url: "ssh://gerrit-int.chromium.org:29419/chromeos/manifest-internal"
                .to_string(),
            external_test_dir: "external".to_string(),
            internal_test_dir: "internal".to_string(),
            internal_remote: "cros-internal".to_string(),
            push_branch: "manifest_update_branch".to_string(),
            upstream_branch: "master".to_string(),
            push_retries: 5,
            commit_message: "Auto-updating manifest to match .DEPS.git file".to_string(),
            jobs: 12,
            work_dir: std::env::temp_dir(),
        }
    }
}

impl UpdateConfig {
    /// Projects synced in the checkout root before reading DEPS files.
    pub fn source_projects(&self) -> Vec<String> {
        vec![self.src_project.clone(), self.src_internal_project.clone()]
    }

    /// Manifest `path` attribute for the browser sources.
    pub fn src_manifest_path(&self) -> String {
        manifest_path(&self.src_root)
    }

    /// Manifest `path` attribute for the private browser sources.
    pub fn src_internal_manifest_path(&self) -> String {
        manifest_path(&self.src_internal_root)
    }

    /// Primary dependency file for the given checkout root.
    pub fn primary_deps(&self, checkout_root: &Path) -> PathBuf {
        checkout_root.join(&self.src_root).join(&self.deps_file_name)
    }

    /// Secondary dependency file for the given checkout root.
    pub fn cros_deps(&self, checkout_root: &Path) -> PathBuf {
        checkout_root.join(&self.src_root).join(&self.cros_deps_file)
    }

    /// Private dependency file for the given checkout root.
    pub fn internal_deps(&self, checkout_root: &Path) -> PathBuf {
        checkout_root
            .join(&self.src_internal_root)
            .join(&self.deps_file_name)
    }

    /// Local clone of the external or internal manifest repository.
    pub fn manifest_checkout(&self, internal: bool) -> PathBuf {
        let dir = if internal {
            &self.internal_manifest_dir
        } else {
            &self.external_manifest_dir
        };
        self.work_dir.join(dir)
    }

    /// Trial checkout directory below the test root.
    pub fn test_dir(&self, test_root: &Path, internal: bool) -> PathBuf {
        test_root.join(if internal {
            &self.internal_test_dir
        } else {
            &self.external_test_dir
        })
    }
}

/// Manifest paths always use `/`, whatever the host separator.
fn manifest_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
