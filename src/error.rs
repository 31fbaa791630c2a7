//! Error kinds for construction and query, per the file format and search contract.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by index construction, loading, and search.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("unsupported file version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("query parameters do not match index header: {0}")]
    IndexMismatch(String),

    #[error("query of length {query_len} is shorter than term size {term_size}")]
    QueryTooShort { query_len: usize, term_size: usize },

    #[error("value out of representable range: {0}")]
    OutOfRange(String),

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::FileIo {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
