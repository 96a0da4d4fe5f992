//! Error types that can be emitted from this library

use std::io;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] io::Error),

    /// A slice was requested outside of its parent's addressable range
    #[error("range {start}+{length} is outside of a reader of {parent_length} bytes")]
    InvalidRange {
        /// Requested start, relative to the parent
        start: u64,
        /// Requested length
        length: u64,
        /// Length of the reader being sliced
        parent_length: u64,
    },

    /// A seek targeted a position beyond the end of the reader
    #[error("position {position} is beyond the end of a reader of {length} bytes")]
    OutOfRange {
        /// Requested position
        position: u64,
        /// Length of the reader
        length: u64,
    },

    /// More bits were requested than the stream has left
    #[error("requested {requested} bits but only {available} remain")]
    EndOfStream {
        /// Number of bits requested
        requested: u64,
        /// Number of bits left in the stream
        available: u64,
    },

    /// A bit count outside of the supported range was used
    #[error("invalid bit count {bits}, at most {max_bits} bits are supported")]
    InvalidBitCount {
        /// Bit count that was requested
        bits: u8,
        /// Maximum supported bit count
        max_bits: u8,
    },
}

impl From<Error> for io::Error {
    fn from(value: Error) -> Self {
        match value {
            Error::IOError(e) => e,
            Error::EndOfStream { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, value),
            other => io::Error::new(io::ErrorKind::InvalidInput, other),
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
