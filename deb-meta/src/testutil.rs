//! In-memory package builders shared by the unit tests

use std::io::Write;

/// Control stanza of the `hello-world_1.0.0-1_amd64.deb` package.
pub const HELLO_CONTROL: &str = "Package: hello-world
Version: 1.0.0-1
Architecture: amd64
Maintainer: Pavel Rezunenko <paulrez@gmail.com>
Installed-Size: 7
Depends: php
Conflicts: python
Description: This is test package
";

pub fn ar_archive(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut builder = ar::Builder::new(&mut out);
        for (name, data) in members {
            let header = ar::Header::new(name.as_bytes().to_vec(), data.len() as u64);
            builder.append(&header, *data).unwrap();
        }
    }
    out
}

pub fn tar_archive(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, data) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, name, *data).unwrap();
    }
    builder.into_inner().unwrap()
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn xz(data: &[u8]) -> Vec<u8> {
    let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn zstd_compress(data: &[u8]) -> Vec<u8> {
    zstd::stream::encode_all(data, 0).unwrap()
}

/// Build a `.deb` whose control archive carries `control` as `./control`.
///
/// `control_member` picks the outer member name and with it the compression.
pub fn deb_with_member(control_member: &str, control: &[u8]) -> Vec<u8> {
    let control_tar = tar_archive(&[
        ("./md5sums", b"d41d8cd98f00b204e9800998ecf8427e  usr/bin/hello\n".as_slice()),
        ("./control", control),
    ]);

    let control_tar = match control_member.rsplit('.').next() {
        Some("gz") => gzip(&control_tar),
        Some("xz") => xz(&control_tar),
        Some("zst") => zstd_compress(&control_tar),
        _ => control_tar,
    };
    let data_tar = gzip(&tar_archive(&[("./usr/bin/hello", b"#!/bin/sh\necho hello\n".as_slice())]));

    ar_archive(&[
        ("debian-binary", b"2.0\n".as_slice()),
        (control_member, control_tar.as_slice()),
        ("data.tar.gz", data_tar.as_slice()),
    ])
}

pub fn deb(control: &[u8]) -> Vec<u8> {
    deb_with_member("control.tar.gz", control)
}
