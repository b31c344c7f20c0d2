//! Checksum generation for Packages index entries
//!
//! Streams the package file once through every selected digest and renders
//! the `MD5sum`, `SHA1` and `SHA256` fields in that fixed order.

use std::fmt;
use std::io::Read;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Selection of digest algorithms to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SumSet(u8);

impl SumSet {
    pub const NONE: SumSet = SumSet(0);
    pub const MD5: SumSet = SumSet(1);
    pub const SHA1: SumSet = SumSet(1 << 1);
    pub const SHA256: SumSet = SumSet(1 << 2);
    pub const ALL: SumSet = SumSet(0b111);

    /// Build a set from raw mask bits, dropping unknown ones.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        SumSet(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: SumSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for SumSet {
    type Output = SumSet;

    fn bitor(self, rhs: SumSet) -> SumSet {
        SumSet(self.0 | rhs.0)
    }
}

impl BitOrAssign for SumSet {
    fn bitor_assign(&mut self, rhs: SumSet) {
        self.0 |= rhs.0;
    }
}

impl FromStr for SumSet {
    type Err = Error;

    /// Parse a comma separated list such as `md5,sha256`.
    fn from_str(s: &str) -> Result<Self> {
        let mut set = SumSet::NONE;

        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            set |= match name.to_ascii_lowercase().as_str() {
                "md5" | "md5sum" => SumSet::MD5,
                "sha1" => SumSet::SHA1,
                "sha256" => SumSet::SHA256,
                "all" => SumSet::ALL,
                "none" => SumSet::NONE,
                _ => return Err(Error::InvalidSumSelection(name.to_string())),
            };
        }

        Ok(set)
    }
}

/// Hex digests of a package file, one per selected algorithm.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSums {
    pub md5: Option<String>,
    pub sha1: Option<String>,
    pub sha256: Option<String>,
}

impl FileSums {
    /// Field name and digest pairs in index order, skipping unselected ones.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("MD5sum", self.md5.as_deref()),
            ("SHA1", self.sha1.as_deref()),
            ("SHA256", self.sha256.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, digest)| digest.map(|d| (label, d)))
    }

    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }
}

impl fmt::Display for FileSums {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, digest) in self.fields() {
            writeln!(f, "{}: {}", label, digest)?;
        }
        Ok(())
    }
}

/// Read `reader` to the end once, feeding every selected digest.
///
/// An empty selection returns empty sums without touching the reader.
pub fn compute_sums<R: Read + ?Sized>(reader: &mut R, sums: SumSet) -> Result<FileSums> {
    if sums.is_empty() {
        return Ok(FileSums::default());
    }

    let mut md5 = sums.contains(SumSet::MD5).then(Md5::new);
    let mut sha1 = sums.contains(SumSet::SHA1).then(Sha1::new);
    let mut sha256 = sums.contains(SumSet::SHA256).then(Sha256::new);

    let mut buffer = [0u8; 65536]; // 64KB buffer
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        let chunk = &buffer[..bytes_read];

        if let Some(hasher) = md5.as_mut() {
            hasher.update(chunk);
        }
        if let Some(hasher) = sha1.as_mut() {
            hasher.update(chunk);
        }
        if let Some(hasher) = sha256.as_mut() {
            hasher.update(chunk);
        }
    }

    Ok(FileSums {
        md5: md5.map(|h| format!("{:x}", h.finalize())),
        sha1: sha1.map(|h| format!("{:x}", h.finalize())),
        sha256: sha256.map(|h| format!("{:x}", h.finalize())),
    })
}
