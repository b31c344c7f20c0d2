//! deb-scanpackages: Packages index generator
//!
//! This crate provides:
//! - Discovery of `.deb` files below a repository directory
//! - Parallel generation of index stanzas
//! - Writing of `Packages` and `Packages.gz`

pub mod error;
pub mod index;

pub use error::{Error, Result};
pub use index::{find_packages, PackagesIndex};
