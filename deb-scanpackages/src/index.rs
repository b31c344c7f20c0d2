//! Packages index assembly
//!
//! Scans a repository directory for `.deb` files and collects one stanza per
//! package, in path order, the way `dpkg-scanpackages` lays out its output.

use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use deb_meta::MetadataBuilder;
use flate2::write::GzEncoder;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Find all `.deb` files below `dir`, sorted by path.
pub fn find_packages(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = Path::new(&glob::Pattern::escape(&dir.to_string_lossy())).join("**/*.deb");
    let pattern_str = pattern.to_string_lossy();

    let mut packages = Vec::new();

    for entry in glob::glob(&pattern_str)? {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    packages.push(path);
                }
            }
            Err(e) => {
                warn!("Glob error: {}", e);
            }
        }
    }

    packages.sort();
    Ok(packages)
}

/// Components of `path` without `.` entries, so that `./pool/a.deb` and
/// `pool/a.deb` compare equal.
fn normalized(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Directory of `path` relative to `root`, joined with `/`.
fn relative_dir(root: &Path, path: &Path) -> Option<String> {
    let path = normalized(path);
    let relative = path.strip_prefix(normalized(root)).ok()?;

    Some(
        relative
            .parent()
            .map(|p| {
                p.components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default(),
    )
}

/// `Filename:` prefix for `path`: `prefix` joined with the directory of
/// `path` relative to the scanned `root`.
pub fn filename_prefix(root: &Path, path: &Path, prefix: &str) -> String {
    let relative_dir = relative_dir(root, path).unwrap_or_else(|| {
        warn!("{:?} is not below {:?}, using bare file name", path, root);
        String::new()
    });

    let prefix = prefix.trim_end_matches('/');
    match (prefix.is_empty(), relative_dir.is_empty()) {
        (true, _) => relative_dir,
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}/{}", prefix, relative_dir),
    }
}

/// Stanzas of every package found in a repository directory.
#[derive(Debug, Default)]
pub struct PackagesIndex {
    stanzas: Vec<Vec<u8>>,
    skipped: usize,
}

impl PackagesIndex {
    /// Scan `root` and build a stanza for each package found.
    ///
    /// Packages that fail to parse are skipped with a warning, unless
    /// `strict` is set, in which case the first failure is returned.
    pub fn scan(root: &Path, builder: &MetadataBuilder, strict: bool) -> Result<Self> {
        let paths = find_packages(root)?;
        info!("Found {} packages in {:?}", paths.len(), root);

        let results: Vec<_> = paths
            .par_iter()
            .map(|path| {
                let prefix = filename_prefix(root, path, builder.prefix());
                let stanza = builder.clone().with_prefix(prefix).build_path(path);
                (path, stanza)
            })
            .collect();

        let mut index = PackagesIndex::default();

        for (path, stanza) in results {
            match stanza {
                Ok(stanza) => {
                    debug!("Indexed {:?}", path);
                    index.push(stanza);
                }
                Err(e) if strict => {
                    return Err(Error::Package {
                        path: path.to_string_lossy().into_owned(),
                        source: e,
                    });
                }
                Err(e) => {
                    warn!("Skipping {:?}: {}", path, e);
                    index.skipped += 1;
                }
            }
        }

        info!(
            "Indexed {} packages, skipped {}",
            index.len(),
            index.skipped
        );
        Ok(index)
    }

    /// Append a stanza, terminating its last line if needed.
    pub fn push(&mut self, mut stanza: Vec<u8>) {
        if !stanza.ends_with(b"\n") {
            stanza.push(b'\n');
        }
        self.stanzas.push(stanza);
    }

    pub fn len(&self) -> usize {
        self.stanzas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stanzas.is_empty()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Write the index, each stanza followed by a blank line.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for stanza in &self.stanzas {
            writer.write_all(stanza)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()
    }

    /// Write the gzip-compressed index.
    pub fn write_gzip<W: Write>(&self, writer: W) -> io::Result<()> {
        let mut encoder = GzEncoder::new(writer, flate2::Compression::best());
        self.write_to(&mut encoder)?;
        encoder.finish()?.flush()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deb_meta::SumSet;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn tar_gz(name: &str, data: &[u8]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, name, data).unwrap();
        let tar = builder.into_inner().unwrap();

        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&tar).unwrap();
        encoder.finish().unwrap()
    }

    fn deb(control: &str) -> Vec<u8> {
        let control_tar = tar_gz("./control", control.as_bytes());
        let mut out = Vec::new();
        {
            let mut builder = ar::Builder::new(&mut out);
            for (name, data) in [
                ("debian-binary", b"2.0\n".as_slice()),
                ("control.tar.gz", control_tar.as_slice()),
            ] {
                let header = ar::Header::new(name.as_bytes().to_vec(), data.len() as u64);
                builder.append(&header, data).unwrap();
            }
        }
        out
    }

    fn repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let pool = dir.path().join("pool/main/h");
        std::fs::create_dir_all(&pool).unwrap();

        std::fs::write(
            dir.path().join("a_1_all.deb"),
            deb("Package: a\nDescription: first\n"),
        )
        .unwrap();
        std::fs::write(
            pool.join("hello_2_amd64.deb"),
            deb("Package: hello\nSection: misc\nDescription: second\n"),
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.deb"), b"not a package").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        dir
    }

    #[test]
    fn test_find_packages_sorted() {
        let dir = repo();
        let found = find_packages(dir.path()).unwrap();

        let names: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["a_1_all.deb", "broken.deb", "pool/main/h/hello_2_amd64.deb"]
        );
    }

    #[test]
    fn test_filename_prefix() {
        let root = Path::new("/repo");
        assert_eq!(filename_prefix(root, Path::new("/repo/a.deb"), ""), "");
        assert_eq!(filename_prefix(root, Path::new("/repo/a.deb"), "dists/"), "dists");
        assert_eq!(
            filename_prefix(root, Path::new("/repo/pool/main/a.deb"), ""),
            "pool/main"
        );
        assert_eq!(
            filename_prefix(root, Path::new("/repo/pool/main/a.deb"), "debian"),
            "debian/pool/main"
        );
    }

    #[test]
    fn test_filename_prefix_relative_root() {
        let root = Path::new(".");
        assert_eq!(filename_prefix(root, Path::new("pool/main/a.deb"), ""), "pool/main");
        assert_eq!(filename_prefix(root, Path::new("./pool/main/a.deb"), ""), "pool/main");
        assert_eq!(filename_prefix(root, Path::new("a.deb"), "debian"), "debian");
        assert_eq!(
            filename_prefix(Path::new("./repo"), Path::new("repo/pool/a.deb"), ""),
            "pool"
        );
        assert_eq!(
            filename_prefix(Path::new("repo/"), Path::new("./repo/pool/a.deb"), "dists"),
            "dists/pool"
        );
    }

    #[test]
    fn test_filename_prefix_outside_root() {
        assert_eq!(filename_prefix(Path::new("/repo"), Path::new("/other/a.deb"), "p"), "p");
    }

    #[test]
    fn test_scan_relative_root() {
        // Relative to the working directory, with a leading `./`.
        let dir = tempfile::tempdir_in(".").unwrap();
        let root = Path::new(".").join(dir.path().file_name().unwrap());
        let pool = root.join("pool/main/h");
        std::fs::create_dir_all(&pool).unwrap();
        std::fs::write(
            pool.join("h_1_all.deb"),
            deb("Package: h\nDescription: nested\n"),
        )
        .unwrap();

        let builder = MetadataBuilder::new(SumSet::NONE);
        let index = PackagesIndex::scan(&root, &builder, true).unwrap();

        let text = String::from_utf8(index.to_bytes()).unwrap();
        assert_eq!(index.len(), 1);
        assert!(
            text.contains("\nFilename: pool/main/h/h_1_all.deb\n"),
            "{}",
            text
        );
    }

    #[test]
    fn test_find_packages_root_with_glob_metacharacters() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["repo[1]", "repo*", "repo?"] {
            let root = dir.path().join(name);
            std::fs::create_dir_all(root.join("pool")).unwrap();
            std::fs::write(root.join("pool/h_1_all.deb"), deb("Package: h\nSection: x\n")).unwrap();

            let found = find_packages(&root).unwrap();
            assert_eq!(found, vec![root.join("pool/h_1_all.deb")], "root {}", name);
        }

        let root = dir.path().join("repo[1]");
        let index = PackagesIndex::scan(&root, &MetadataBuilder::new(SumSet::NONE), true).unwrap();
        assert!(String::from_utf8(index.to_bytes())
            .unwrap()
            .contains("\nFilename: pool/h_1_all.deb\n"));
    }

    #[test]
    fn test_scan_skips_broken_packages() {
        let dir = repo();
        let builder = MetadataBuilder::new(SumSet::MD5);

        let index = PackagesIndex::scan(dir.path(), &builder, false).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.skipped(), 1);

        let text = String::from_utf8(index.to_bytes()).unwrap();
        let stanzas: Vec<_> = text.split("\n\n").filter(|s| !s.is_empty()).collect();
        assert_eq!(stanzas.len(), 2);
        assert!(stanzas[0].starts_with("Package: a\nFilename: a_1_all.deb\nSize: "));
        assert!(stanzas[1].starts_with(
            "Package: hello\nFilename: pool/main/h/hello_2_amd64.deb\nSize: "
        ));
        assert!(stanzas[1].contains("\nMD5sum: "));
        assert!(stanzas[1].ends_with("Section: misc\nDescription: second"));
        assert!(text.ends_with("second\n\n"));
    }

    #[test]
    fn test_scan_strict_fails_on_broken_package() {
        let dir = repo();
        let builder = MetadataBuilder::new(SumSet::ALL);

        let err = PackagesIndex::scan(dir.path(), &builder, true).unwrap_err();
        match err {
            Error::Package { path, source } => {
                assert!(path.ends_with("broken.deb"));
                assert!(matches!(source, deb_meta::Error::Format(_)));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_push_terminates_stanza() {
        let mut index = PackagesIndex::default();
        index.push(b"Package: a".to_vec());
        index.push(b"Package: b\n".to_vec());

        assert_eq!(index.to_bytes(), b"Package: a\n\nPackage: b\n\n");
    }

    #[test]
    fn test_write_gzip() {
        let mut index = PackagesIndex::default();
        index.push(b"Package: a\n".to_vec());

        let mut compressed = Vec::new();
        index.write_gzip(&mut compressed).unwrap();

        let mut decoded = Vec::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, index.to_bytes());
    }
}
