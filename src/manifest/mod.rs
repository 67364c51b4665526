//! Repo manifest regeneration.
//!
//! The manifest is a hand-maintained XML document with exactly one
//! autogenerated region bounded by two marker comments. Everything outside
//! the region is preserved byte-for-byte; the region itself is rebuilt from
//! the projects pinned in the dependency files.
//!
//! - **`partition`**: split a document around the markers
//! - **`template`**: render `<project>` entries and section headers
//! - **`convert`**: turn a path → project mapping into entries
//! - **`xml`**: read project lists back out of manifest XML
//! - **`safety`**: refuse to drop projects that were never ours
//! - **`builder`**: assemble the new document

pub mod builder;
pub mod convert;
pub mod partition;
pub mod safety;
pub mod template;
pub mod xml;

pub use builder::ManifestBuilder;
pub use convert::{Conversion, ConversionWarning, convert_mappings};
pub use partition::{BEGIN_MARKER, END_MARKER, Partition};
pub use safety::check_for_foreign_projects;
pub use template::{CROS_HEADER, EXTERNAL_HEADER, INTERNAL_HEADER, ProjectEntry, ProjectTemplate};
pub use xml::{ManifestProject, parse_projects, project_names, wrap_snippet};
