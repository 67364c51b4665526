mod staged;
mod update;

pub use staged::{StagedManifest, is_different};
pub use update::{ManifestUpdate, UpdateOutcome, UpdateState};
