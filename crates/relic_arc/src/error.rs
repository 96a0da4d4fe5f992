//! Error types that can be emitted from this library

use std::io;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Transparent wrapper for [`relic_stream::error::Error`]
    #[error(transparent)]
    StreamError(#[from] relic_stream::error::Error),

    /// Transparent wrapper for [`relic_huffman::error::Error`]
    #[error(transparent)]
    HuffmanError(#[from] relic_huffman::error::Error),

    /// file is an invalid archive
    #[error("file is an invalid archive")]
    InvalidArchive,

    /// unable to find requested file
    #[error("unable to find requested file")]
    FileNotFound(#[from] FileNotFoundError),

    /// compressed entry data is corrupt
    #[error("compressed entry data is corrupt: {0}")]
    CorruptData(String),

    /// entry data does not match its checksum
    #[error("checksum mismatch, expected {expected:#010x} but found {actual:#010x}")]
    ChecksumMismatch {
        /// Checksum stored in the archive
        expected: u32,
        /// Checksum of the data that was read
        actual: u32,
    },

    /// entry names may not contain NUL bytes
    #[error("entry names may not contain NUL bytes: {0:?}")]
    InvalidName(String),

    /// archive would not fit the 32 bit offsets of the format
    #[error("archive would not fit the 32 bit offsets of the format")]
    ArchiveTooLarge,
}

/// Error type to provide further information when a file has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested file")]
pub enum FileNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by name {0}
    #[error("by name {0}")]
    Name(String),
}

impl From<Error> for io::Error {
    fn from(value: Error) -> Self {
        match value {
            Error::IOError(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
