//! This library handles reading from and creating the **RLCA** archives the game ships its data in.
//!
//! # Archive Format Documentation
//!
//! An archive bundles many named entries into a single file. Each entry is either stored as it
//! is or compressed with the adaptive Huffman code from [`relic_huffman`]. Reading never copies
//! the archive: every structure is read through a [`relic_stream::BoundedSliceReader`] of the
//! underlying reader, so a corrupt offset can never make a read escape its region.
//!
//! ## File Structure
//!
//! An archive consists of a header, followed by the entry data, an entry table and a name block.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "RLCA"                                            |
//! | 0x0004         | Version                | 2 bytes: Fixed value `1`                                   |
//! | 0x0006         | Reserved               | 2 bytes: Zero                                              |
//! | 0x0008         | Entry Count            | 4 bytes: Number of entries in the archive                  |
//! | 0x000C         | Table Offset           | 4 bytes: Offset to the entry table                         |
//! | 0x0010         | Names Size             | 4 bytes: Size of the name block                            |
//!
//! ### Entry Data
//!
//! The data of every entry follows the header back to back, in the order the entries were added.
//!
//! ### Entry Table
//!
//! One 24 byte record per entry:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | CRC32                  | 4 bytes: CRC-32/ISO-HDLC of the decompressed data       |
//! | 0x0004         | Size                   | 4 bytes: Size of the data when decompressed             |
//! | 0x0008         | Data Offset            | 4 bytes: Offset from the start of the file to the data  |
//! | 0x000C         | Method                 | 4 bytes: `0` stored, `1` adaptive Huffman               |
//! | 0x0010         | Stored Size            | 4 bytes: Size of the data inside the archive            |
//! | 0x0014         | Name Offset            | 4 bytes: Offset of the name within the name block       |
//!
//! ### Name Block
//!
//! Names are stored as NUL terminated strings directly after the entry table.
//!
//! ### Huffman Entries
//!
//! A Huffman entry codes each byte as a symbol of a 257 symbol alphabet and finishes with the
//! end of data symbol `256`, padding the final byte with zero bits. Decoding stops once the
//! recorded size has been produced; an end of data symbol before that point means the entry is
//! corrupt.
//!
//! ## Additional Information
//!
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Offsets**: 32 bit, so an archive is limited to 4 GiB
//!

pub mod compression;
pub mod error;
pub mod read;
pub mod types;
pub mod write;

pub use compression::CompressionMethod;
pub use read::{Archive, ArchiveEntry};
pub use write::{ArchiveWriter, ArchiveWriterOptions};
