//! Reading `<project>` elements back out of manifest XML.

use crate::error::{Result, UpdateError};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashSet;

/// A project as declared in a manifest, reduced to what the checks need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestProject {
    pub name: String,
    pub path: Option<String>,
    pub remote: Option<String>,
}

/// Wraps a fragment of project entries in a minimal manifest so it parses
/// on its own.
pub fn wrap_snippet(content: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<manifest>\n{}\n</manifest>",
        content
    )
}

/// Lists every `<project>` element in document order.
///
/// # Errors
///
/// `Xml` if the document is malformed or a project has no `name`.
pub fn parse_projects(xml: &str) -> Result<Vec<ManifestProject>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut projects = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                if e.name().as_ref() == b"project" {
                    projects.push(parse_project(e)?);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(UpdateError::Xml(format!(
                    "Error parsing manifest XML: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(projects)
}

/// Names of every project in the document.
pub fn project_names(xml: &str) -> Result<HashSet<String>> {
    Ok(parse_projects(xml)?.into_iter().map(|p| p.name).collect())
}

fn get_attr(e: &BytesStart, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| UpdateError::Xml(format!("Invalid attribute: {}", e)))?;
        if attr.key.as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(|e| UpdateError::Xml(format!("Invalid attribute value: {}", e)))?;
            return Ok(Some(value.to_string()));
        }
    }
    Ok(None)
}

fn parse_project(e: &BytesStart) -> Result<ManifestProject> {
    let name = get_attr(e, b"name")?.ok_or_else(|| {
        UpdateError::Xml("Missing required attribute 'name' on <project>".to_string())
    })?;

    Ok(ManifestProject {
        name,
        path: get_attr(e, b"path")?,
        remote: get_attr(e, b"remote")?,
    })
}
