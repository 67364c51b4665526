use crate::error::{Result, UpdateError};
use regex::Regex;

pub const BEGIN_MARKER: &str =
    "<!-- @@@@ BEGIN AUTOGENERATED BROWSER PROJECTS - DON'T MODIFY! @@@@ -->";

pub const END_MARKER: &str =
    "<!-- @@@@ END AUTOGENERATED BROWSER PROJECTS - DON'T MODIFY! @@@@ -->";

/// A manifest split around its autogenerated region.
///
/// Borrowed slices of the original document; the markers themselves are not
/// part of any slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition<'a> {
    /// Everything before the begin marker.
    pub prefix: &'a str,
    /// Everything strictly between the markers.
    pub body: &'a str,
    /// Everything after the end marker.
    pub suffix: &'a str,
}

impl<'a> Partition<'a> {
    /// Splits at the begin marker and the end marker after it.
    ///
    /// # Errors
    ///
    /// `MarkersNotFound` if either marker is missing, the end marker only
    /// appears before the begin marker, or either marker appears more than
    /// once.
    pub fn split(document: &'a str) -> Result<Self> {
        let pattern = format!(
            r"(?s)\A(.*?){}(.*?){}(.*)\z",
            regex::escape(BEGIN_MARKER),
            regex::escape(END_MARKER)
        );
        let re = Regex::new(&pattern)?;

        let caps = re
            .captures(document)
            .ok_or(UpdateError::MarkersNotFound)?;
        let group = |i| caps.get(i).map_or("", |m| m.as_str());
        let (prefix, body, suffix) = (group(1), group(2), group(3));

        let repeated = |text: &str| text.contains(BEGIN_MARKER) || text.contains(END_MARKER);
        if repeated(body) || repeated(suffix) {
            log::error!("Manifest has more than one autogenerated region");
            return Err(UpdateError::MarkersNotFound);
        }

        Ok(Self {
            prefix,
            body,
            suffix,
        })
    }

    /// Puts the document back together with the original markers.
    pub fn reassemble(&self) -> String {
        let mut out = String::with_capacity(
            self.prefix.len()
                + self.body.len()
                + self.suffix.len()
                + BEGIN_MARKER.len()
                + END_MARKER.len(),
        );
        out.push_str(self.prefix);
        out.push_str(BEGIN_MARKER);
        out.push_str(self.body);
        out.push_str(END_MARKER);
        out.push_str(self.suffix);
        out
    }

    /// The hand-maintained part of the document with the region cut out.
    pub fn surrounding(&self) -> String {
        format!("{}{}", self.prefix, self.suffix)
    }
}

/// Drops blank lines at the start of `text`, keeping the indentation of the
/// first line that has content. All-whitespace input yields `""`.
pub fn strip_leading_blank_lines(text: &str) -> &str {
    let Some(first) = text.find(|c: char| !c.is_whitespace()) else {
        return "";
    };
    let line_start = text[..first].rfind('\n').map_or(0, |nl| nl + 1);
    &text[line_start..]
}
