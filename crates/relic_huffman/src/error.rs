//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`relic_stream::error::Error`]
    #[error(transparent)]
    StreamError(#[from] relic_stream::error::Error),

    /// the tree was used outside of its contract
    #[error("invalid argument")]
    InvalidArgument(#[from] InvalidArgument),
}

/// Error type to provide further information when the tree is used outside of its contract
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum InvalidArgument {
    /// a tree needs between 2 and 16384 symbols
    #[error("a tree needs between 2 and 16384 symbols, not {0}")]
    SymbolCount(usize),

    /// node index outside of the tree
    #[error("node {index} is outside of a tree of {node_count} nodes")]
    NodeIndex {
        /// Index that was requested
        index: usize,
        /// Number of nodes in the tree
        node_count: usize,
    },

    /// symbol outside of the alphabet
    #[error("symbol {symbol} is outside of an alphabet of {symbol_count} symbols")]
    Symbol {
        /// Symbol that was requested
        symbol: u16,
        /// Number of symbols in the tree
        symbol_count: usize,
    },

    /// node {0} is a leaf and has no children
    #[error("node {0} is a leaf and has no children")]
    Leaf(usize),

    /// node {0} is internal and holds no symbol
    #[error("node {0} is internal and holds no symbol")]
    Internal(usize),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
