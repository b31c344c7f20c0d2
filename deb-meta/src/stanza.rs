//! Control stanza validation and field splicing
//!
//! The stanza is handled as raw bytes so that every existing line is kept
//! exactly as the package shipped it.

use crate::{Error, Result};

/// Marker whose occurrences identify the package a stanza describes.
pub const PACKAGE_MARKER: &[u8] = b"Package";

/// Field markers that new fields are inserted before, in priority order.
pub const INSERT_BEFORE: [&[u8]; 3] = [b"Section", b"Priority", b"Description"];

/// Count non-overlapping occurrences of `needle` in `haystack`.
fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    if needle.is_empty() {
        return 0;
    }

    let mut count = 0;
    let mut pos = 0;
    while let Some(found) = find(&haystack[pos..], needle) {
        count += 1;
        pos += found + needle.len();
    }
    count
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Check that the stanza describes exactly one package.
///
/// This counts raw occurrences of `Package` anywhere in the text, not only
/// field names, so the word appearing in another field also counts.
pub fn validate(stanza: &[u8]) -> Result<()> {
    match count_occurrences(stanza, PACKAGE_MARKER) {
        0 => Err(Error::MissingPackageField),
        1 => Ok(()),
        _ => Err(Error::MultiplePackageField),
    }
}

/// Byte offset where index fields go: the last occurrence of the first
/// marker in [`INSERT_BEFORE`] present in the stanza.
pub fn insertion_point(stanza: &[u8]) -> Option<usize> {
    INSERT_BEFORE
        .iter()
        .find_map(|marker| rfind(stanza, marker))
}

/// Insert `fields` at byte offset `at`, leaving everything else untouched.
pub fn splice(stanza: &[u8], at: usize, fields: &[u8]) -> Vec<u8> {
    let (left, right) = stanza.split_at(at);

    let mut out = Vec::with_capacity(stanza.len() + fields.len());
    out.extend_from_slice(left);
    out.extend_from_slice(fields);
    out.extend_from_slice(right);
    out
}
