use crate::config::CHROMIUM_ROOT;
use crate::manifest::template::{ProjectEntry, ProjectTemplate};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

/// Why an entry from a dependency file was left out of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionWarning {
    /// The project is already declared outside the autogenerated region.
    Blacklisted { project: String, deps_file: String },
    /// The project was already emitted for another path in this pass.
    DoubleCheckout { project: String, path: String },
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionWarning::Blacklisted { project, deps_file } => {
                write!(f, "Skipping project {} in {}", project, deps_file)
            }
            ConversionWarning::DoubleCheckout { project, path } => {
                write!(f, "Found double checkout of {} to {}", project, path)
            }
        }
    }
}

/// Result of converting one dependency file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversion {
    pub entries: Vec<ProjectEntry>,
    pub warnings: Vec<ConversionWarning>,
}

impl Conversion {
    pub fn render(&self) -> String {
        self.entries.iter().map(ProjectEntry::render).collect()
    }
}

/// Converts a path → project mapping into manifest entries.
///
/// Entries come out ordered by project id, ties broken by path, so output is
/// stable across runs. When several paths check out the same project only the
/// first in that order is kept. Skipped entries are logged as warnings and
/// also returned in [`Conversion::warnings`]; neither aborts the pass.
pub fn convert_mappings(
    mappings: &BTreeMap<String, String>,
    template: &ProjectTemplate,
    blacklist: Option<&HashSet<String>>,
    deps_file: &Path,
) -> Conversion {
    let mut ordered: Vec<(&String, &String)> = mappings.iter().collect();
    ordered.sort_by(|(path_a, project_a), (path_b, project_b)| {
        project_a.cmp(project_b).then_with(|| path_a.cmp(path_b))
    });

    let mut conversion = Conversion::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for (rel_path, project) in ordered {
        let path = format!("{}/{}", CHROMIUM_ROOT, rel_path.trim_start_matches('/'));

        let warning = if blacklist.is_some_and(|b| b.contains(project)) {
            Some(ConversionWarning::Blacklisted {
                project: project.clone(),
                deps_file: deps_file.display().to_string(),
            })
        } else if seen.contains(project.as_str()) {
            Some(ConversionWarning::DoubleCheckout {
                project: project.clone(),
                path: path.clone(),
            })
        } else {
            None
        };

        match warning {
            Some(warning) => {
                log::warn!("{}", warning);
                conversion.warnings.push(warning);
            }
            None => {
                log::debug!("Adding {} at {}", project, path);
                conversion.entries.push(template.entry(&path, project));
                seen.insert(project.as_str());
            }
        }
    }

    conversion
}
