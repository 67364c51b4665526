//! Shared fixtures for manifest-sync integration tests
//!
//! Tests build a fake repo checkout on disk (a `.repo/` marker plus the
//! dependency files under `chromium/`) and a manifest repository holding
//! `oldlayout.xml`. External tools are replaced by recording doubles.

use assert_cmd::cargo::cargo_bin_cmd;
use manifest_sync::vcs::{ManifestOverride, ManifestPublisher, TrialCheckout};
use manifest_sync::{Result, UpdateError};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(unused)]
pub const BEGIN: &str = manifest_sync::manifest::BEGIN_MARKER;
#[allow(unused)]
pub const END: &str = manifest_sync::manifest::END_MARKER;

/// Manifest with hand-maintained projects on both sides of the region.
#[allow(unused)]
pub fn live_manifest(region: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest>
  <remote name="cros" fetch="https://chromium.googlesource.com" />
  <project path="a/b" name="a/b" />

  {BEGIN}
{region}
  {END}

  <project path="src/third_party/kernel" name="chromiumos/third_party/kernel" />
</manifest>
"#
    )
}

/// Writes a primary DEPS file from `(path, url)` pairs.
#[allow(unused)]
pub fn deps_file(entries: &[(&str, &str)]) -> String {
    let mut out = String::from("vars = {\n  \"git_url\": \"https://chromium.googlesource.com\",\n}\n\n");
    out.push_str("deps = {\n");
    for (path, url) in entries {
        out.push_str(&format!("  \"{}\": \"{}\",\n", path, url));
    }
    out.push_str("}\n");
    out
}

/// A fake checkout with `.repo/` and the DEPS files a build reads.
#[allow(unused)]
pub fn create_checkout(primary: &[(&str, &str)], cros: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::create_dir_all(root.join(".repo")).unwrap();
    let src = root.join("chromium/src");
    fs::create_dir_all(src.join("tools/cros.DEPS")).unwrap();
    fs::write(src.join(".DEPS.git"), deps_file(primary)).unwrap();
    fs::write(src.join("tools/cros.DEPS/DEPS"), deps_file(cros)).unwrap();

    let internal = root.join("chromium/src-internal");
    fs::create_dir_all(&internal).unwrap();
    fs::write(internal.join(".DEPS.git"), deps_file(&[])).unwrap();

    temp
}

/// Writes `content` as the live manifest inside a fresh manifest directory.
#[allow(unused)]
pub fn create_manifest_repo(content: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("oldlayout.xml");
    fs::write(&path, content).unwrap();
    (temp, path)
}

#[allow(unused)]
pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

/// Trial checkout that records every sync and can be told to fail.
#[allow(unused)]
#[derive(Default)]
pub struct RecordingCheckout {
    pub syncs: RefCell<Vec<ManifestOverride>>,
    pub fail_local: bool,
}

impl TrialCheckout for RecordingCheckout {
    fn sync(&self, manifest: &ManifestOverride, _jobs: usize) -> Result<()> {
        self.syncs.borrow_mut().push(manifest.clone());
        match manifest {
            ManifestOverride::Local(_) if self.fail_local => Err(UpdateError::CommandFailed {
                command: "repo sync --jobs 12".into(),
                status: "exit status: 1".into(),
                stderr: "error: Cannot fetch chromium/bogus".into(),
            }),
            _ => Ok(()),
        }
    }
}

/// Publisher that only records what it was asked to publish.
#[allow(unused)]
#[derive(Default)]
pub struct RecordingPublisher {
    pub prepared: RefCell<u32>,
    pub published: RefCell<Vec<PathBuf>>,
}

impl ManifestPublisher for RecordingPublisher {
    fn prepare(&self) -> Result<()> {
        *self.prepared.borrow_mut() += 1;
        Ok(())
    }

    fn publish(&self, manifest: &Path) -> Result<()> {
        self.published.borrow_mut().push(manifest.to_path_buf());
        Ok(())
    }

    fn dry_run(&self) -> bool {
        true
    }
}

/// Helper to run the binary
#[allow(unused)]
pub fn run_update(cwd: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = cargo_bin_cmd!("update-manifest");
    cmd.args(args).current_dir(cwd).env_remove("RUST_LOG");
    cmd.assert()
}
