//! Base types for structure of an archive file.

use crate::compression::CompressionMethod;
use binrw::{BinRead, BinWrite};

/// Size in bytes of [`ArchiveHeader`] once written
pub const HEADER_SIZE: u64 = 20;

/// Size in bytes of one [`ArchiveRecord`] once written
pub const RECORD_SIZE: u64 = 24;

/// The only format version this library reads and writes
pub const FORMAT_VERSION: u16 = 1;

/// Archive header
///
/// Always starts with "RLCA" followed by the format version.
/// All data is stored in little endian format
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b"RLCA", little)]
pub struct ArchiveHeader {
    /// Format version, only [`FORMAT_VERSION`] is understood
    #[br(assert(version == FORMAT_VERSION, "unsupported archive version {}", version))]
    pub version: u16,

    /// Unused, written as zero
    pub reserved: u16,

    /// The number of entries stored in the file
    pub entry_count: u32,

    /// The offset from the beginning of the file where the entry table starts
    pub table_offset: u32,

    /// The size of the name block that follows the entry table
    pub names_size: u32,
}

impl Default for ArchiveHeader {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            reserved: 0,
            entry_count: 0,
            table_offset: HEADER_SIZE as u32,
            names_size: 0,
        }
    }
}

/// Archive entry record
///
/// Describes where an entry's data lives and how it was stored
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct ArchiveRecord {
    /// A CRC-32/ISO-HDLC checksum of the decompressed data
    pub crc32: u32,

    /// The size of the data for this entry once decompressed
    pub size: u32,

    /// The offset to the data for this entry from the start of the file
    pub offset: u32,

    /// How this entry's data is stored
    pub method: CompressionMethod,

    /// The size of this entry's data inside the archive
    pub stored_size: u32,

    /// The offset from the start of the name block for this entry's name
    pub name_offset: u32,
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::BinRead;
    use binrw::BinWrite;
    use pretty_assertions::assert_eq;

    use crate::compression::CompressionMethod;
    use crate::error::Result;
    use crate::types::{ArchiveHeader, ArchiveRecord};

    #[test]
    fn read_empty_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x52, 0x4C, 0x43, 0x41,
            0x01, 0x00,
            0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x14, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ]);

        assert_eq!(ArchiveHeader::read(&mut input)?, ArchiveHeader::default());

        Ok(())
    }

    #[test]
    fn read_header_rejects_other_versions() {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x52, 0x4C, 0x43, 0x41,
            0x02, 0x00,
            0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x14, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ]);

        assert!(ArchiveHeader::read(&mut input).is_err());
    }

    #[test]
    fn read_header_rejects_bad_magic() {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x52, 0x4C, 0x43, 0x42,
            0x01, 0x00,
            0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x14, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ]);

        assert!(ArchiveHeader::read(&mut input).is_err());
    }

    #[test]
    fn write_header() -> Result<()> {
        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            0x52, 0x4C, 0x43, 0x41,
            0x01, 0x00,
            0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x40, 0x00, 0x00, 0x00,
            0x12, 0x00, 0x00, 0x00,
        ];

        let header = ArchiveHeader {
            entry_count: 2,
            table_offset: 0x40,
            names_size: 0x12,
            ..Default::default()
        };

        let mut actual = Vec::new();
        header.write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn read_record() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x56, 0xB1, 0x17, 0x4A,
            0x0B, 0x00, 0x00, 0x00,
            0x14, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x09, 0x00, 0x00, 0x00,
            0x0A, 0x00, 0x00, 0x00,
        ]);

        let expected = ArchiveRecord {
            crc32: 0x4A17B156,
            size: 11,
            offset: 20,
            method: CompressionMethod::Huffman,
            stored_size: 9,
            name_offset: 10,
        };

        assert_eq!(ArchiveRecord::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn read_record_rejects_unknown_method() {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x14, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ]);

        assert!(ArchiveRecord::read(&mut input).is_err());
    }

    #[test]
    fn write_record() -> Result<()> {
        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x14, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];

        let record = ArchiveRecord {
            offset: 20,
            method: CompressionMethod::None,
            ..Default::default()
        };

        let mut actual = Vec::new();
        record.write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);

        Ok(())
    }
}
