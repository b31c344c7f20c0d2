use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed ar/tar framing, a bad compression stream, or a read that
    /// failed while walking the archive.
    #[error("Archive format error: {0}")]
    Format(#[source] std::io::Error),

    #[error("No Package field in control file")]
    MissingPackageField,

    /// The control file names more than one package, which means the
    /// archive is a bundle of packages.
    #[error("Multiple Package fields in control file")]
    MultiplePackageField,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown checksum algorithm: {0}")]
    InvalidSumSelection(String),
}

pub type Result<T> = std::result::Result<T, Error>;
