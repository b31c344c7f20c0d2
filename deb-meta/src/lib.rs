//! deb-meta: Packages index metadata for Debian binary packages
//!
//! This crate provides:
//! - Sequential member lookup in ar and tar containers
//! - Transparent decompression of the control archive
//! - Control stanza extraction and validation
//! - One-pass MD5/SHA1/SHA256 checksums of the package file
//! - Splicing of Filename/Size/checksum fields into the stanza

pub mod checksum;
pub mod compression;
pub mod container;
pub mod control;
pub mod error;
pub mod metadata;
pub mod stanza;

#[cfg(test)]
pub(crate) mod testutil;

pub use checksum::{compute_sums, FileSums, SumSet};
pub use control::extract_control;
pub use error::{Error, Result};
pub use metadata::MetadataBuilder;
