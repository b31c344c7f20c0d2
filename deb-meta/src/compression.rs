//! Transparent decompression of archive members
//!
//! The codec is chosen from the member name, the way `dpkg-deb` names the
//! control archive (`control.tar.gz`, `control.tar.xz`, `control.tar.zst`).

use std::io::Read;

use flate2::read::GzDecoder;
use xz2::read::XzDecoder;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Xz,
    Zstd,
}

impl Compression {
    /// Detect the codec from a member name. GNU ar terminates names with `/`,
    /// which is ignored.
    pub fn from_member_name(name: &str) -> Self {
        let name = name.trim_end_matches('/');

        if name.ends_with(".gz") {
            Compression::Gzip
        } else if name.ends_with(".xz") {
            Compression::Xz
        } else if name.ends_with(".zst") {
            Compression::Zstd
        } else {
            Compression::None
        }
    }

    /// Wrap `body` in a decoder for this codec. `None` passes the stream through.
    pub fn wrap<'a>(self, body: &'a mut dyn Read) -> Result<Box<dyn Read + 'a>> {
        let reader: Box<dyn Read + 'a> = match self {
            Compression::None => Box::new(body),
            Compression::Gzip => Box::new(GzDecoder::new(body)),
            Compression::Xz => Box::new(XzDecoder::new(body)),
            Compression::Zstd => {
                Box::new(zstd::stream::read::Decoder::new(body).map_err(Error::Format)?)
            }
        };
        Ok(reader)
    }
}
