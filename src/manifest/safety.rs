use crate::error::{Result, UpdateError};
use crate::manifest::xml::{parse_projects, wrap_snippet};

/// Verifies that every project in `region` lives under `namespace`.
///
/// `region` is the text about to be discarded from the autogenerated section.
/// The markers bounding it are plain comments, so if they drift around
/// hand-maintained entries this is what stops those entries from vanishing
/// on the next regeneration.
///
/// # Errors
///
/// - `ProjectAboutToBeRemoved` naming the first offending project
/// - `Xml` if the region does not parse as manifest entries
pub fn check_for_foreign_projects(region: &str, namespace: &str) -> Result<()> {
    for project in parse_projects(&wrap_snippet(region))? {
        let path = project.path.as_deref().unwrap_or_default();
        if !path.starts_with(namespace) {
            log::error!(
                "Project {} (path '{}') is outside {} and would be dropped",
                project.name,
                path,
                namespace
            );
            return Err(UpdateError::ProjectAboutToBeRemoved(project.name));
        }
    }
    Ok(())
}
