use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{path}: {source}")]
    Package {
        path: String,
        #[source]
        source: deb_meta::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
