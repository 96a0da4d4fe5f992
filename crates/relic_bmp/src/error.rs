//! Error types that can be emitted from this library

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

    /// the bitmap uses a feature this library does not handle
    #[error("unsupported bitmap: {0}")]
    #[diagnostic(help("only uncompressed 8 bit indexed and 24 bit images are supported"))]
    Unsupported(String),

    /// the bitmap's headers contradict each other or the file
    #[error("invalid bitmap: {0}")]
    InvalidBitmap(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
