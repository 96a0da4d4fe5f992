//! Seekable, sliceable readers and bit-level I/O shared by every relic format reader.
//!
//! # Readers
//!
//! [`SeekableReader`] is the capability every binary reader in relic is written against: a
//! known length, a cursor, and a positional read that leaves the cursor alone. Two leaf
//! implementations are provided:
//!
//! - [`ByteReader`] over any in-memory buffer (`Vec<u8>`, `&[u8]`, arrays, ...)
//! - [`FileReader`] over any [`std::io::Read`] + [`std::io::Seek`] source, usually a file
//!
//! # Slices
//!
//! [`SeekableReader::slice`] confines a reader to a sub-range and returns a
//! [`BoundedSliceReader`], which is a [`SeekableReader`] in its own right and can be sliced
//! again. Ranges are validated with overflow-checked 64-bit arithmetic against the immediate
//! parent, so a decoder handed a slice of an archive can never read outside of its entry.
//!
//! | Request                                   | Result                             |
//! |-------------------------------------------|------------------------------------|
//! | `start + length <= parent.length()`       | slice of `length` bytes at `start` |
//! | `start > parent.length()`                 | [`error::Error::InvalidRange`]     |
//! | `start + length > parent.length()`        | [`error::Error::InvalidRange`]     |
//! | `start + length` overflows `u64`          | [`error::Error::InvalidRange`]     |
//!
//! All readers also implement [`std::io::Read`] and [`std::io::Seek`] so fixed-layout records
//! can be parsed from them directly.
//!
//! # Bits
//!
//! [`BitReader`] and [`BitWriter`] move up to [`bits::MAX_BITS`] bits at a time, most
//! significant bit first. Flushing a partial byte pads its low bits with zeros.
//!

pub mod bits;
pub mod error;
pub mod read;
pub mod slice;

pub use bits::{BitReader, BitWriter};
pub use read::{ByteReader, FileReader, SeekableReader};
pub use slice::BoundedSliceReader;
