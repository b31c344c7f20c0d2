//! Control file extraction
//!
//! A `.deb` is an ar archive holding `debian-binary`, a compressed
//! `control.tar.*` and `data.tar.*`. The control stanza lives in the
//! `control` member of the control tarball.

use std::io::{self, Read};

use crate::compression::Compression;
use crate::container::{locate, ArMembers, MemberMatch, TarMembers};
use crate::{Error, Result};

/// Name prefix of the control tarball in the outer archive.
pub const CONTROL_ARCHIVE: &str = "control.tar";

/// Name suffix of the control file inside the control tarball.
pub const CONTROL_FILE: &str = "control";

/// Copy the raw control file of the package read from `reader`.
///
/// A missing control tarball or control file leaves the result empty; the
/// caller detects that through Package field validation.
pub fn extract_control<R: Read>(reader: R) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut outer = ArMembers::new(reader);

    locate(&mut outer, MemberMatch::Prefix(CONTROL_ARCHIVE), |name, body| {
        let decoded = Compression::from_member_name(name).wrap(body)?;
        let mut archive = tar::Archive::new(decoded);
        let mut inner = TarMembers::new(&mut archive)?;

        locate(&mut inner, MemberMatch::Suffix(CONTROL_FILE), |_, control| {
            io::copy(control, &mut buf).map_err(Error::Format)
        })
    })?;

    Ok(buf)
}
