//! Sequential member lookup in ar and tar containers
//!
//! Both container formats are walked the same way: read headers in order,
//! hand the body of the first member whose name matches to a handler, and
//! treat the end of the container as "not found" rather than an error.

use std::io::{self, Read};

use tracing::{debug, trace};

use crate::{Error, Result};

/// A named member of a container, with its body positioned at the start.
pub struct Member<B> {
    pub name: String,
    pub body: B,
}

/// A container that yields its members one at a time.
///
/// Each body borrows the container, so it must be dropped before the next
/// member is requested.
pub trait MemberSource {
    type Body<'a>: Read
    where
        Self: 'a;

    /// Advance to the next member header. `None` marks the end of the container.
    fn next_member(&mut self) -> Option<io::Result<Member<Self::Body<'_>>>>;
}

/// How a member name is compared against the wanted name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberMatch<'p> {
    Prefix(&'p str),
    Suffix(&'p str),
}

impl MemberMatch<'_> {
    pub fn matches(&self, name: &str) -> bool {
        match *self {
            MemberMatch::Prefix(p) => name.starts_with(p),
            MemberMatch::Suffix(s) => name.ends_with(s),
        }
    }
}

/// Scan `source` for the first member matching `wanted` and run `handler` on it.
///
/// Returns `Ok(None)` when the container ends without a match. Scanning stops
/// at the first match and the handler's result is returned as-is.
pub fn locate<S, T, F>(source: &mut S, wanted: MemberMatch<'_>, handler: F) -> Result<Option<T>>
where
    S: MemberSource,
    F: FnOnce(&str, &mut dyn Read) -> Result<T>,
{
    while let Some(member) = source.next_member() {
        let Member { name, mut body } = member.map_err(Error::Format)?;

        if wanted.matches(&name) {
            debug!(member = %name, "located archive member");
            return handler(&name, &mut body).map(Some);
        }

        trace!(member = %name, "skipping archive member");
    }

    Ok(None)
}

/// Members of an `ar` archive, the outer framing of a `.deb`.
pub struct ArMembers<R: Read> {
    archive: ar::Archive<R>,
}

impl<R: Read> ArMembers<R> {
    pub fn new(reader: R) -> Self {
        Self {
            archive: ar::Archive::new(reader),
        }
    }
}

impl<R: Read> MemberSource for ArMembers<R> {
    type Body<'a>
        = ar::Entry<'a, R>
    where
        Self: 'a;

    fn next_member(&mut self) -> Option<io::Result<Member<Self::Body<'_>>>> {
        self.archive.next_entry().map(|entry| {
            entry.map(|entry| {
                let name = String::from_utf8_lossy(entry.header().identifier()).into_owned();
                Member { name, body: entry }
            })
        })
    }
}

/// Members of a tar stream.
pub struct TarMembers<'a, R: 'a + Read> {
    entries: tar::Entries<'a, R>,
}

impl<'a, R: 'a + Read> TarMembers<'a, R> {
    pub fn new(archive: &'a mut tar::Archive<R>) -> Result<Self> {
        let entries = archive.entries().map_err(Error::Format)?;
        Ok(Self { entries })
    }
}

impl<'a, R: 'a + Read> MemberSource for TarMembers<'a, R> {
    type Body<'b>
        = tar::Entry<'a, R>
    where
        Self: 'b;

    fn next_member(&mut self) -> Option<io::Result<Member<Self::Body<'_>>>> {
        self.entries.next().map(|entry| {
            entry.map(|entry| {
                let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
                Member { name, body: entry }
            })
        })
    }
}
