//! Assembly of the regenerated manifest document.

use crate::config::{NAMESPACE_PREFIX, UpdateConfig};
use crate::deps::DepsReader;
use crate::error::Result;
use crate::manifest::convert::convert_mappings;
use crate::manifest::partition::{BEGIN_MARKER, END_MARKER, Partition, strip_leading_blank_lines};
use crate::manifest::safety::check_for_foreign_projects;
use crate::manifest::template::{CROS_HEADER, EXTERNAL_HEADER, INTERNAL_HEADER, ProjectTemplate};
use crate::manifest::xml::project_names;
use std::collections::HashSet;
use std::path::Path;

/// Builds a new manifest from a live one and the dependency files in a
/// checkout.
///
/// The output is a pure function of the live document and the mappings the
/// reader returns, so unchanged inputs give byte-identical documents.
pub struct ManifestBuilder<'a> {
    config: &'a UpdateConfig,
    checkout_root: &'a Path,
    internal: bool,
    reader: &'a dyn DepsReader,
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(
        config: &'a UpdateConfig,
        checkout_root: &'a Path,
        internal: bool,
        reader: &'a dyn DepsReader,
    ) -> Self {
        Self {
            config,
            checkout_root,
            internal,
            reader,
        }
    }

    /// Regenerates the autogenerated region of `live`.
    ///
    /// ## Layout
    ///
    /// 1. Everything before the begin marker, unchanged
    /// 2. Begin marker and the browser section: `chromium/src` followed by the
    ///    primary DEPS entries
    /// 3. The CrOS section: secondary DEPS entries not already declared
    ///    elsewhere in the manifest
    /// 4. For internal manifests, the private section: `chromium/src-internal`
    ///    followed by the private DEPS entries
    /// 5. End marker, then everything after it minus leading blank lines
    ///
    /// # Errors
    ///
    /// - `MarkersNotFound` if the region cannot be located
    /// - `ProjectAboutToBeRemoved` if the region holds a project outside the
    ///   `chromium/` namespace
    /// - Whatever the reader returns for unreadable dependency files
    pub fn build(&self, live: &str) -> Result<String> {
        let partition = Partition::split(live)?;
        check_for_foreign_projects(partition.body, NAMESPACE_PREFIX)?;

        let external = ProjectTemplate::External;
        let mut out = String::with_capacity(live.len());

        out.push_str(partition.prefix);
        out.push_str(BEGIN_MARKER);
        out.push_str("\n\n");

        out.push_str(EXTERNAL_HEADER);
        out.push_str(&external.render(
            &self.config.src_manifest_path(),
            &self.config.src_project,
        ));
        let primary = self.config.primary_deps(self.checkout_root);
        out.push_str(&self.convert(&primary, &external, None)?);
        out.push('\n');

        // Projects the surrounding document already declares stay where the
        // humans put them.
        let declared = project_names(&partition.surrounding())?;
        out.push_str(CROS_HEADER);
        let cros = self.config.cros_deps(self.checkout_root);
        out.push_str(&self.convert(&cros, &external, Some(&declared))?);
        out.push('\n');

        if self.internal {
            let template = ProjectTemplate::Internal {
                remote: self.config.internal_remote.clone(),
            };
            out.push_str(INTERNAL_HEADER);
            out.push_str(&template.render(
                &self.config.src_internal_manifest_path(),
                &self.config.src_internal_project,
            ));
            let private = self.config.internal_deps(self.checkout_root);
            out.push_str(&self.convert(&private, &template, None)?);
            out.push('\n');
        }

        out.push_str(END_MARKER);
        out.push_str("\n\n");
        out.push_str(strip_leading_blank_lines(partition.suffix));

        Ok(out)
    }

    fn convert(
        &self,
        deps_file: &Path,
        template: &ProjectTemplate,
        blacklist: Option<&HashSet<String>>,
    ) -> Result<String> {
        log::debug!("Converting {}", deps_file.display());
        let mappings = self.reader.read_mappings(deps_file)?;
        Ok(convert_mappings(&mappings, template, blacklist, deps_file).render())
    }
}
