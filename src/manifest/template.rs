use crate::config::TRACKING_REVISION;
use quick_xml::escape::escape;

pub const EXTERNAL_HEADER: &str = "  <!-- Begin Chromium (browser) projects -->\n  <!-- Hardcoded revision=\"refs/heads/master\" is intentional here -->\n\n";

pub const CROS_HEADER: &str = "  <!-- Begin CrOS-specific Chromium (browser) projects -->\n  <!-- Hardcoded revision=\"refs/heads/master\" is intentional here -->\n\n";

pub const INTERNAL_HEADER: &str = "  <!-- Begin Chrome browser (PRIVATE) projects -->\n  <!-- Hardcoded revision=\"refs/heads/master\" is intentional here -->\n\n";

/// One `<project>` line group in the generated region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub path: String,
    pub name: String,
    pub remote: Option<String>,
}

impl ProjectEntry {
    /// Renders the entry with one attribute per line, aligned under the
    /// first attribute.
    pub fn render(&self) -> String {
        let mut out = String::from("  <project ");
        if let Some(remote) = &self.remote {
            out.push_str(&format!("remote=\"{}\"\n           ", escape(remote.as_str())));
        }
        out.push_str(&format!(
            "path=\"{}\"\n           name=\"{}\"\n           revision=\"{}\" />\n",
            escape(self.path.as_str()),
            escape(self.name.as_str()),
            TRACKING_REVISION
        ));
        out
    }
}

/// Which kind of entry a conversion pass emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectTemplate {
    /// Public project, fetched from the manifest's default remote.
    External,
    /// Private project, fetched from the named remote.
    Internal { remote: String },
}

impl ProjectTemplate {
    pub fn entry(&self, path: &str, name: &str) -> ProjectEntry {
        ProjectEntry {
            path: path.to_string(),
            name: name.to_string(),
            remote: match self {
                ProjectTemplate::External => None,
                ProjectTemplate::Internal { remote } => Some(remote.clone()),
            },
        }
    }

    pub fn render(&self, path: &str, name: &str) -> String {
        self.entry(path, name).render()
    }
}
