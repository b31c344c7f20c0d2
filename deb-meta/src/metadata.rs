//! Packages index stanza generation
//!
//! Builds the index entry for one package by combining:
//! - The control stanza shipped in the package
//! - The package file name and size
//! - Checksums of the whole package file

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, warn};

use crate::checksum::{compute_sums, SumSet};
use crate::control::extract_control;
use crate::stanza;
use crate::Result;

/// Join a `Filename:` prefix and a package file name with `/`.
///
/// The result is cleaned lexically: empty and `.` components are dropped
/// and `..` removes the preceding component where there is one.
fn join_filename(prefix: &str, name: &str) -> String {
    let rooted = prefix.starts_with('/') || (prefix.is_empty() && name.starts_with('/'));

    let mut parts: Vec<&str> = Vec::new();
    for part in prefix.split('/').chain(name.split('/')) {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            _ => parts.push(part),
        }
    }

    let joined = parts.join("/");
    if rooted {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Generates Packages index stanzas for `.deb` files.
#[derive(Debug, Clone, Default)]
pub struct MetadataBuilder {
    sums: SumSet,
    prefix: String,
}

impl MetadataBuilder {
    pub fn new(sums: SumSet) -> Self {
        Self {
            sums,
            prefix: String::new(),
        }
    }

    /// Directory prepended to the package file name in the `Filename:` field.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn sums(&self) -> SumSet {
        self.sums
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Build the index stanza for the package at `path`.
    pub fn build_path(&self, path: &Path) -> Result<Vec<u8>> {
        let file = File::open(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.build(&mut BufReader::new(file), &file_name)
    }

    /// Build the index stanza for the package read from `file`.
    ///
    /// `file` must be positioned at the start of the package. It is read
    /// twice: once for the control file and once, from offset 0, for the
    /// checksums. `file_name` is the package's base name.
    pub fn build<F: Read + Seek>(&self, file: &mut F, file_name: &str) -> Result<Vec<u8>> {
        let control = extract_control(&mut *file)?;
        stanza::validate(&control)?;

        let size = file.seek(SeekFrom::End(0))?;
        file.seek(SeekFrom::Start(0))?;

        let Some(at) = stanza::insertion_point(&control) else {
            warn!(
                "No Section, Priority or Description in {}, index fields not added",
                file_name
            );
            return Ok(control);
        };

        let mut fields = format!(
            "Filename: {}\nSize: {}\n",
            join_filename(&self.prefix, file_name),
            size
        );
        fields.push_str(&compute_sums(file, self.sums)?.to_string());

        debug!("Inserting index fields for {} at offset {}", file_name, at);
        Ok(stanza::splice(&control, at, fields.as_bytes()))
    }
}
