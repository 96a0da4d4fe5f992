//! Types for reading archives
//!

use binrw::BinRead;
use byteorder::ReadBytesExt;
use crc::Digest;
use indexmap::IndexMap;
use relic_stream::{BoundedSliceReader, SeekableReader};
use std::{
    fmt::{self, Debug},
    io::{self, Read},
};
use tracing::{debug, instrument, warn};

use crate::{
    compression::{ArchiveBlockReader, CompressionMethod, CHECKSUM},
    error::{Error, FileNotFoundError, Result},
    types::{ArchiveHeader, ArchiveRecord, HEADER_SIZE, RECORD_SIZE},
};

/// A struct for reading an entry from an archive
///
/// Reading through [`std::io::Read`] streams the decompressed bytes and checks the stored
/// checksum once the end is reached; [`ArchiveEntry::contents`] does the same in one call.
pub struct ArchiveEntry<'a, R: SeekableReader> {
    data: &'a EntryData,
    source: &'a R,
    reader: ArchiveBlockReader<'a, R>,
    digest: Option<Digest<'static, u32>>,
}

impl<R: SeekableReader> Debug for ArchiveEntry<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ArchiveEntry({:#?})", self.data)
    }
}

/// Methods for retrieving information on archive entries
impl<'a, R: SeekableReader> ArchiveEntry<'a, R> {
    /// Get the name of the entry
    ///
    /// # Warnings
    ///
    /// It is dangerous to use this name directly when extracting an archive.
    /// It may contain an absolute path (`/etc/shadow`), or break out of the
    /// current directory (`../runtime`).
    pub fn name(&self) -> &str {
        &self.data.file_name
    }

    /// Get the name of the entry, in the raw byte representation.
    pub fn name_raw(&self) -> &[u8] {
        &self.data.file_name_raw
    }

    /// Get the size of the entry, in bytes, inside the archive
    pub fn stored_size(&self) -> u64 {
        self.data.stored_size
    }

    /// Get the size of the entry, in bytes, when decompressed
    pub fn size(&self) -> u64 {
        self.data.size
    }

    /// Get the CRC32 checksum of the decompressed entry
    pub fn crc32(&self) -> u32 {
        self.data.crc32
    }

    /// Get the offset of the entry's stored data from the start of the archive
    pub fn data_start(&self) -> u64 {
        self.data.data_start
    }

    /// Get the method used to store this entry
    pub fn compression_method(&self) -> CompressionMethod {
        self.data.compression_method
    }

    /// A fresh reader over the bytes exactly as they are stored in the archive
    pub fn stored(&self) -> Result<BoundedSliceReader<'a, R>> {
        Ok(BoundedSliceReader::new(
            self.source,
            self.data.data_start,
            self.data.stored_size,
        )?)
    }

    /// Decompress the whole entry and verify its checksum
    #[instrument(skip(self), fields(name = %self.data.file_name), err)]
    pub fn contents(self) -> Result<Vec<u8>> {
        let out = self.reader.read_all()?;
        if out.len() as u64 != self.data.size {
            return Err(Error::CorruptData(format!(
                "expected {} bytes but found {}",
                self.data.size,
                out.len()
            )));
        }

        let actual = CHECKSUM.checksum(&out);
        if actual != self.data.crc32 {
            return Err(Error::ChecksumMismatch {
                expected: self.data.crc32,
                actual,
            });
        }

        Ok(out)
    }
}

impl<R: SeekableReader> Read for ArchiveEntry<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let read = self.reader.read(buf)?;
        if read > 0 {
            if let Some(digest) = self.digest.as_mut() {
                digest.update(&buf[..read]);
            }
        } else if let Some(digest) = self.digest.take() {
            let actual = digest.finalize();
            if actual != self.data.crc32 {
                return Err(Error::ChecksumMismatch {
                    expected: self.data.crc32,
                    actual,
                }
                .into());
            }
        }

        Ok(read)
    }
}

/// Structure representing an archive entry.
#[derive(Debug, Clone, Default)]
pub struct EntryData {
    /// CRC32 checksum of the decompressed data
    pub crc32: u32,
    /// Method of storing the entry in the archive
    pub compression_method: CompressionMethod,
    /// Size of the entry in the archive
    pub stored_size: u64,
    /// Size of the entry when decompressed
    pub size: u64,
    /// Name of the entry
    pub file_name: Box<str>,
    /// Raw entry name. To be used when file_name was incorrectly decoded.
    pub file_name_raw: Box<[u8]>,
    /// Specifies where the stored data of the entry starts
    pub data_start: u64,
}

#[derive(Debug)]
pub(crate) struct Shared {
    header: ArchiveHeader,
    files: IndexMap<Box<str>, EntryData>,
}

/// Archive reader
///
/// ```no_run
/// use relic_stream::FileReader;
///
/// fn list_archive_contents(path: &str) -> relic_arc::error::Result<()> {
///     let archive = relic_arc::Archive::new(FileReader::open(path)?)?;
///
///     for i in 0..archive.len() {
///         let mut entry = archive.by_index(i)?;
///         println!("Filename: {}", entry.name());
///         std::io::copy(&mut entry, &mut std::io::stdout())?;
///     }
///
///     Ok(())
/// }
/// ```
pub struct Archive<R> {
    reader: R,
    shared: Shared,
}

impl<R> Archive<R> {
    /// Total size of the entries in the archive once decompressed, if it fits.
    pub fn decompressed_size(&self) -> Option<u128> {
        let mut total = 0u128;
        for file in self.shared.files.values() {
            total = total.checked_add(file.size as u128)?;
        }
        Some(total)
    }

    /// Number of entries contained in this archive.
    pub fn len(&self) -> usize {
        self.shared.files.len()
    }

    /// Whether this archive contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Format version found in the header
    pub fn version(&self) -> u16 {
        self.shared.header.version
    }

    /// Returns an iterator over all the entry names in this archive.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.shared.files.keys().map(|s| s.as_ref())
    }

    /// Get the index of an entry by name, if it's present.
    #[inline(always)]
    pub fn index_for_name(&self, name: &str) -> Option<usize> {
        self.shared.files.get_index_of(name)
    }

    /// Get the name of an entry, if it's present.
    #[inline(always)]
    pub fn name_for_index(&self, index: usize) -> Option<&str> {
        self.shared
            .files
            .get_index(index)
            .map(|(name, _)| name.as_ref())
    }

    /// Unwrap and return the inner reader object
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: SeekableReader> Archive<R> {
    /// Read an archive collecting the entries it contains.
    ///
    /// Nothing but the header, entry table and name block is read here.
    #[instrument(skip(reader), err)]
    pub fn new(reader: R) -> Result<Archive<R>> {
        match Self::get_metadata(&reader) {
            Ok(shared) => Ok(Archive { reader, shared }),
            Err(e) => {
                debug!(error = %e, "rejecting archive");
                Err(Error::InvalidArchive)
            }
        }
    }

    /// Search for an entry by name
    pub fn by_name(&self, name: &str) -> Result<ArchiveEntry<'_, R>> {
        let Some(index) = self.shared.files.get_index_of(name) else {
            return Err(Error::FileNotFound(FileNotFoundError::Name(
                name.to_owned(),
            )));
        };
        self.by_index(index)
    }

    /// Get a contained entry by index
    pub fn by_index(&self, file_number: usize) -> Result<ArchiveEntry<'_, R>> {
        let (_, data) = self
            .shared
            .files
            .get_index(file_number)
            .ok_or(Error::FileNotFound(FileNotFoundError::Index(file_number)))?;

        let stored = self.reader.slice(data.data_start, data.stored_size)?;
        Ok(ArchiveEntry {
            data,
            source: &self.reader,
            reader: ArchiveBlockReader::new(stored, data.size, data.compression_method)?,
            digest: Some(CHECKSUM.digest()),
        })
    }

    fn get_records(reader: &R, header: &ArchiveHeader) -> Result<Vec<ArchiveRecord>> {
        let mut record_reader = reader.slice(
            u64::from(header.table_offset),
            u64::from(header.entry_count) * RECORD_SIZE,
        )?;

        (0..header.entry_count)
            .map(|_| ArchiveRecord::read(&mut record_reader).map_err(Error::from))
            .collect()
    }

    fn get_name(names: &BoundedSliceReader<'_, R>, offset: u32) -> Result<Vec<u8>> {
        let offset = u64::from(offset);
        let mut name_reader = names.slice(offset, names.length().saturating_sub(offset))?;

        let mut name_raw: Vec<u8> = Vec::new();
        loop {
            let char = name_reader.read_u8()?;
            if char == b'\0' {
                break;
            }
            name_raw.push(char);
        }
        Ok(name_raw)
    }

    fn get_metadata(reader: &R) -> Result<Shared> {
        let mut header_reader = reader.slice(0, HEADER_SIZE)?;
        let header = ArchiveHeader::read(&mut header_reader)?;
        let records = Self::get_records(reader, &header)?;

        let names = reader.slice(
            u64::from(header.table_offset) + u64::from(header.entry_count) * RECORD_SIZE,
            u64::from(header.names_size),
        )?;

        let mut index_map = IndexMap::with_capacity(header.entry_count as usize);
        for record in records {
            // every entry has to point inside the archive
            reader.slice(u64::from(record.offset), u64::from(record.stored_size))?;

            let name = Self::get_name(&names, record.name_offset)?;
            let file = EntryData {
                crc32: record.crc32,
                compression_method: record.method,
                stored_size: u64::from(record.stored_size),
                size: u64::from(record.size),
                data_start: u64::from(record.offset),
                file_name: String::from_utf8_lossy(&name).into(),
                file_name_raw: name.into(),
            };
            let file_name = file.file_name.clone();
            if index_map.insert(file_name.clone(), file).is_some() {
                warn!(name = %file_name, "duplicate entry name, keeping the last one");
            }
        }

        debug!(entries = index_map.len(), "read archive metadata");
        Ok(Shared {
            header,
            files: index_map,
        })
    }
}
