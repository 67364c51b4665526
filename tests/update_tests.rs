mod common;

use common::*;
use manifest_sync::UpdateError;
use manifest_sync::config::UpdateConfig;
use manifest_sync::deps::DepsFileReader;
use manifest_sync::manifest::{CROS_HEADER, EXTERNAL_HEADER, ManifestBuilder, parse_projects};
use manifest_sync::ops::{ManifestUpdate, UpdateOutcome, UpdateState};
use manifest_sync::vcs::ManifestOverride;
use pretty_assertions::assert_eq;
use std::path::Path;

const OLD_REGION: &str = "  <project path=\"chromium/src/old\"\n           name=\"org/old\"\n           revision=\"refs/heads/master\" />";

fn update<'a>(
    config: &'a UpdateConfig,
    checkout_root: &'a Path,
    manifest: &Path,
    internal: bool,
    checkout: &'a RecordingCheckout,
    publisher: &'a RecordingPublisher,
) -> ManifestUpdate<'a> {
    ManifestUpdate::new(
        config,
        checkout_root,
        manifest.to_path_buf(),
        internal,
        &DepsFileReader,
        checkout,
        publisher,
    )
}

#[test]
fn test_update_rewrites_region_from_deps() {
    let checkout = create_checkout(
        &[
            ("src/foo", "https://chromium.googlesource.com/org/foo.git@1234abcd"),
            ("src/bar", "https://chromium.googlesource.com/org/bar.git"),
        ],
        &[],
    );
    let (_repo, manifest) = create_manifest_repo(&live_manifest(OLD_REGION));
    let config = UpdateConfig::default();
    let trial = RecordingCheckout::default();
    let publisher = RecordingPublisher::default();

    let outcome = update(&config, checkout.path(), &manifest, false, &trial, &publisher)
        .perform_update()
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::Published { dry_run: true });

    let expected = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest>
  <remote name="cros" fetch="https://chromium.googlesource.com" />
  <project path="a/b" name="a/b" />

  {BEGIN}

{EXTERNAL_HEADER}  <project path="chromium/src"
           name="chromium/src"
           revision="refs/heads/master" />
  <project path="chromium/src/bar"
           name="org/bar"
           revision="refs/heads/master" />
  <project path="chromium/src/foo"
           name="org/foo"
           revision="refs/heads/master" />

{CROS_HEADER}
{END}

  <project path="src/third_party/kernel" name="chromiumos/third_party/kernel" />
</manifest>
"#
    );
    assert_eq!(read(&manifest), expected);
    assert_eq!(*publisher.published.borrow(), vec![manifest.clone()]);
}

#[test]
fn test_identical_rerun_is_unchanged() {
    let checkout = create_checkout(
        &[("src/foo", "https://chromium.googlesource.com/org/foo.git")],
        &[],
    );
    let (_repo, manifest) = create_manifest_repo(&live_manifest(OLD_REGION));
    let config = UpdateConfig::default();

    let first_trial = RecordingCheckout::default();
    let first_publisher = RecordingPublisher::default();
    update(&config, checkout.path(), &manifest, false, &first_trial, &first_publisher)
        .perform_update()
        .unwrap();
    let after_first = read(&manifest);

    let trial = RecordingCheckout::default();
    let publisher = RecordingPublisher::default();
    let mut second = update(&config, checkout.path(), &manifest, false, &trial, &publisher);
    let outcome = second.perform_update().unwrap();

    assert_eq!(outcome, UpdateOutcome::Unchanged);
    assert_eq!(second.state(), UpdateState::Unchanged);
    assert!(trial.syncs.borrow().is_empty());
    assert!(publisher.published.borrow().is_empty());
    assert_eq!(read(&manifest), after_first);
}

#[test]
fn test_rebuilding_output_is_a_fixed_point() {
    let checkout = create_checkout(
        &[
            ("src/third_party/zlib", "https://chromium.googlesource.com/chromium/zlib.git"),
            ("src/v8", "https://chromium.googlesource.com/v8/v8.git@deadbeef"),
        ],
        &[(
            "src/third_party/chromite",
            "https://chromium.googlesource.com/chromiumos/chromite.git",
        )],
    );
    let config = UpdateConfig::default();
    let builder = ManifestBuilder::new(&config, checkout.path(), false, &DepsFileReader);

    let once = builder.build(&live_manifest(OLD_REGION)).unwrap();
    let twice = builder.build(&once).unwrap();
    assert_eq!(once, twice);

    let names: Vec<_> = parse_projects(&once)
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert!(names.contains(&"v8/v8".to_string()));
    assert!(names.contains(&"chromiumos/chromite".to_string()));
    assert!(!names.contains(&"org/old".to_string()));
}

#[test]
fn test_cros_projects_declared_outside_region_are_skipped() {
    let checkout = create_checkout(
        &[],
        &[
            (
                "src/third_party/kernel",
                "https://chromium.googlesource.com/chromiumos/third_party/kernel.git",
            ),
            (
                "src/third_party/chromite",
                "https://chromium.googlesource.com/chromiumos/chromite.git",
            ),
        ],
    );
    let config = UpdateConfig::default();
    let builder = ManifestBuilder::new(&config, checkout.path(), false, &DepsFileReader);

    let built = builder.build(&live_manifest(OLD_REGION)).unwrap();
    let kernel_entries = built.matches("chromiumos/third_party/kernel").count();

    assert_eq!(kernel_entries, 1, "kernel stays declared only outside the region");
    assert!(built.contains("name=\"chromiumos/chromite\""));
}

#[test]
fn test_internal_manifest_gets_private_section() {
    let checkout = create_checkout(&[], &[]);
    let (_repo, manifest) = create_manifest_repo(&live_manifest(""));
    let config = UpdateConfig::default();
    let trial = RecordingCheckout::default();
    let publisher = RecordingPublisher::default();

    update(&config, checkout.path(), &manifest, true, &trial, &publisher)
        .perform_update()
        .unwrap();

    let content = read(&manifest);
    assert!(content.contains("<!-- Begin Chrome browser (PRIVATE) projects -->"));
    assert!(content.contains("path=\"chromium/src-internal\""));
    assert!(content.contains("name=\"chrome/src-internal\""));
    assert!(content.contains("remote=\"cros-internal\""));
}

#[test]
fn test_foreign_project_in_region_aborts() {
    let checkout = create_checkout(
        &[("src/foo", "https://chromium.googlesource.com/org/foo.git")],
        &[],
    );
    let region = "  <project path=\"src/platform/evil\" name=\"chromiumos/platform/evil\" />";
    let original = live_manifest(region);
    let (_repo, manifest) = create_manifest_repo(&original);
    let config = UpdateConfig::default();
    let trial = RecordingCheckout::default();
    let publisher = RecordingPublisher::default();

    let mut run = update(&config, checkout.path(), &manifest, false, &trial, &publisher);
    let err = run.perform_update().unwrap_err();

    assert!(matches!(
        err,
        UpdateError::ProjectAboutToBeRemoved(ref name) if name == "chromiumos/platform/evil"
    ));
    assert_eq!(run.state(), UpdateState::Aborted);
    assert!(!run.staged_path().exists());
    assert!(trial.syncs.borrow().is_empty());
    assert_eq!(read(&manifest), original);
}

#[test]
fn test_failed_trial_sync_reverts_and_keeps_live_manifest() {
    let checkout = create_checkout(
        &[("src/foo", "https://chromium.googlesource.com/org/foo.git")],
        &[],
    );
    let original = live_manifest(OLD_REGION);
    let (_repo, manifest) = create_manifest_repo(&original);
    let config = UpdateConfig::default();
    let trial = RecordingCheckout {
        fail_local: true,
        ..Default::default()
    };
    let publisher = RecordingPublisher::default();

    let mut run = update(&config, checkout.path(), &manifest, false, &trial, &publisher);
    let err = run.perform_update().unwrap_err();

    assert!(matches!(err, UpdateError::TrialSyncFailed(_)));
    assert_eq!(trial.syncs.borrow().last(), Some(&ManifestOverride::Default));
    assert!(publisher.published.borrow().is_empty());
    assert_eq!(read(&manifest), original);
}

#[test]
fn test_missing_markers_abort_before_any_sync() {
    let checkout = create_checkout(&[], &[]);
    let original = "<manifest>\n  <project path=\"a/b\" name=\"a/b\" />\n</manifest>\n";
    let (_repo, manifest) = create_manifest_repo(original);
    let config = UpdateConfig::default();
    let trial = RecordingCheckout::default();
    let publisher = RecordingPublisher::default();

    let err = update(&config, checkout.path(), &manifest, false, &trial, &publisher)
        .perform_update()
        .unwrap_err();

    assert!(matches!(err, UpdateError::MarkersNotFound));
    assert!(trial.syncs.borrow().is_empty());
    assert_eq!(read(&manifest), original);
}

#[test]
fn test_staged_manifest_differs_before_publish() {
    let checkout = create_checkout(
        &[
            ("src/foo", "https://chromium.googlesource.com/org/foo.git"),
            ("src/bar", "https://chromium.googlesource.com/org/bar.git"),
        ],
        &[],
    );
    let original = live_manifest(OLD_REGION);
    let (_repo, manifest) = create_manifest_repo(&original);
    let config = UpdateConfig::default();
    let trial = RecordingCheckout::default();
    let publisher = RecordingPublisher::default();

    let mut run = update(&config, checkout.path(), &manifest, false, &trial, &publisher);
    run.create_new_manifest().unwrap();

    assert!(run.is_new_manifest_different().unwrap());
    assert_eq!(read(&manifest), original);

    let staged = read(run.staged_path());
    let bar = staged.find("name=\"org/bar\"").unwrap();
    let foo = staged.find("name=\"org/foo\"").unwrap();
    assert!(bar < foo);
    assert!(staged.contains("<project path=\"a/b\" name=\"a/b\" />"));
}

#[test]
fn test_duplicate_region_aborts_before_any_write() {
    let checkout = create_checkout(
        &[("src/foo", "https://chromium.googlesource.com/org/foo.git")],
        &[],
    );
    let original = format!(
        "{}\n  {BEGIN}\n  <project path=\"src/platform/dev\" name=\"chromiumos/platform/dev\" />\n  {END}\n",
        live_manifest(OLD_REGION)
    );
    let (_repo, manifest) = create_manifest_repo(&original);
    let config = UpdateConfig::default();
    let trial = RecordingCheckout::default();
    let publisher = RecordingPublisher::default();

    let mut run = update(&config, checkout.path(), &manifest, false, &trial, &publisher);
    let err = run.perform_update().unwrap_err();

    assert!(matches!(err, UpdateError::MarkersNotFound));
    assert_eq!(run.state(), UpdateState::Aborted);
    assert!(!run.staged_path().exists());
    assert!(trial.syncs.borrow().is_empty());
    assert_eq!(read(&manifest), original);
}
