use std::path::{Path, PathBuf};

use crate::listing::ListingError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: i64 },

    #[error("{0}")]
    Invalid(String),

    #[error("path '{0}' resolves outside the site root")]
    UnsafePath(String),

    #[error("cannot regenerate listing in {}: {source}", path.display())]
    Listing {
        path: PathBuf,
        #[source]
        source: ListingError,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Short machine-readable code used in API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not-found",
            Error::Invalid(_) => "malformed-input",
            Error::UnsafePath(_) => "unsafe-path",
            Error::Listing { .. } => "document-shape",
            Error::Io { .. } | Error::Json { .. } => "io",
        }
    }
}
